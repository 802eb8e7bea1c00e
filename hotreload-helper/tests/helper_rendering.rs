use std::path::PathBuf;

use hotreload_core::types::PluginManifest;
use hotreload_helper::{HelperContext, HelperFile, Renderer, HELPER_ACTION, HELPER_ID};
use tempfile::TempDir;

fn render_default() -> Vec<(PathBuf, String)> {
    Renderer::new()
        .expect("renderer")
        .render(&HelperContext::default())
        .expect("render")
}

#[test]
fn renders_manifest_then_main() {
    let files = render_default();
    let paths: Vec<_> = files.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("manifest.json"), PathBuf::from("main.js")]
    );
}

#[test]
fn manifest_is_a_valid_plugin_manifest() {
    let files = render_default();
    let manifest: PluginManifest =
        serde_json::from_str(&files[0].1).expect("rendered manifest must be JSON");
    assert_eq!(manifest.id.as_str(), HELPER_ID);
    assert_eq!(manifest.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(manifest.min_app_version.as_deref(), Some("0.15.0"));
    assert!(!manifest.is_desktop_only);
}

#[test]
fn main_registers_protocol_handler_for_action() {
    let files = render_default();
    let main = &files[1].1;
    assert!(main.contains("registerObsidianProtocolHandler(ACTION"));
    assert!(main.contains(&format!("const ACTION = \"{HELPER_ACTION}\";")));
    assert!(main.contains("disablePlugin(id)"));
    assert!(main.contains("enablePlugin(id)"));
    assert!(main.contains("module.exports = HotReloadHelper;"));
}

#[test]
fn quotes_in_context_are_json_escaped() {
    let ctx = HelperContext {
        name: "Helper \"dev\"".to_string(),
        ..HelperContext::default()
    };
    let files = Renderer::new().unwrap().render(&ctx).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&files[0].1).expect("valid JSON");
    assert_eq!(manifest["name"], "Helper \"dev\"");
    assert!(!files[0].1.contains("&quot;"), "output must not be HTML-escaped");
}

#[test]
fn rendering_is_deterministic() {
    assert_eq!(render_default(), render_default());
}

#[test]
fn user_template_overrides_embedded_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("main.js.tera"),
        "// custom helper for {{ id }}\n",
    )
    .unwrap();

    let files = Renderer::with_user_templates(dir.path())
        .unwrap()
        .render(&HelperContext::default())
        .unwrap();
    assert_eq!(files[1].1, format!("// custom helper for {HELPER_ID}\n"));
    assert!(files[0].1.contains("\"minAppVersion\""), "manifest keeps default");
}

#[test]
fn unrelated_files_in_override_dir_are_ignored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("styles.css.tera"), "{{ broken").unwrap();

    let renderer = Renderer::with_user_templates(dir.path()).unwrap();
    let out = renderer
        .render_file(&HelperContext::default(), HelperFile::Manifest)
        .unwrap();
    assert!(out.starts_with('{'));
}
