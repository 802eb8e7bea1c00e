//! End-to-end tests for the `hotreload` binary against throwaway projects
//! and vaults. HOME and the config dir point into temp dirs so the real
//! hash store and vault list are never touched.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    home: TempDir,
    project: TempDir,
    vault_parent: TempDir,
}

impl Env {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            project.path().join("manifest.json"),
            r#"{"id":"sample-plugin","name":"Sample","version":"1.0.0"}"#,
        )
        .unwrap();
        fs::write(project.path().join("main.js"), "module.exports = 1;").unwrap();

        let vault_parent = TempDir::new().unwrap();
        fs::create_dir_all(vault_parent.path().join("Dev Vault/.obsidian")).unwrap();
        Self {
            home,
            project,
            vault_parent,
        }
    }

    fn vault(&self) -> PathBuf {
        self.vault_parent.path().join("Dev Vault")
    }

    fn plugin_dir(&self) -> PathBuf {
        self.vault().join(".obsidian/plugins/sample-plugin")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hotreload"));
        cmd.env("HOME", self.home.path())
            .env("USERPROFILE", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("HOTRELOAD_VAULT")
            .arg("--project")
            .arg(self.project.path());
        cmd
    }

    /// Register the vault in the app's vault list (Linux layout).
    #[cfg(target_os = "linux")]
    fn register_vault(&self) {
        let state = self.home.path().join(".config/obsidian");
        fs::create_dir_all(&state).unwrap();
        let body = serde_json::json!({
            "vaults": { "abc123": { "path": self.vault(), "ts": 1 } }
        });
        fs::write(state.join("obsidian.json"), body.to_string()).unwrap();
    }
}

/// Kills a long-running `hotreload watch` when the test ends.
struct Running(Child);

impl Drop for Running {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn wait_for_content(path: &Path, expected: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if fs::read_to_string(path).map(|c| c == expected).unwrap_or(false) {
            return true;
        }
        thread::sleep(Duration::from_millis(100));
    }
    false
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn install_dry_run_reports_files_and_writes_nothing() {
    let env = Env::new();
    env.cmd()
        .arg("install")
        .arg("--vault")
        .arg(env.vault())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("main.js"));

    assert!(!env.plugin_dir().exists());
    assert!(!env.vault().join(".obsidian/community-plugins.json").exists());
    assert!(!env.home.path().join(".hotreload").exists());
}

#[test]
fn install_copies_enables_and_status_reports_in_sync() {
    let env = Env::new();
    env.cmd()
        .arg("install")
        .arg("--vault")
        .arg(env.vault())
        .assert()
        .success()
        .stdout(predicate::str::contains("enabled sample-plugin"));

    assert_eq!(
        fs::read_to_string(env.plugin_dir().join("main.js")).unwrap(),
        "module.exports = 1;"
    );
    assert!(env
        .vault()
        .join(".obsidian/plugins/hotreload-helper/main.js")
        .is_file());
    let enabled = read_json(&env.vault().join(".obsidian/community-plugins.json"));
    assert_eq!(enabled, serde_json::json!(["sample-plugin", "hotreload-helper"]));

    let output = env
        .cmd()
        .arg("status")
        .arg("--vault")
        .arg(env.vault())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["plugin"], "sample-plugin");
    assert_eq!(status["vault"], "Dev Vault");
    assert_eq!(status["enabled"], true);
    assert_eq!(status["in_sync"], true);
    assert!(status["installed_at"].is_string());
}

#[test]
fn second_install_is_up_to_date() {
    let env = Env::new();
    let install = |env: &Env| {
        env.cmd()
            .arg("install")
            .arg("--vault")
            .arg(env.vault())
            .arg("--no-helper")
            .assert()
            .success()
    };
    install(&env);
    install(&env).stdout(predicate::str::contains("up to date"));
}

#[test]
fn status_flags_stale_copy() {
    let env = Env::new();
    env.cmd()
        .args(["install", "--no-helper", "--vault"])
        .arg(env.vault())
        .assert()
        .success();
    fs::write(env.project.path().join("main.js"), "module.exports = 2;").unwrap();

    let output = env
        .cmd()
        .args(["status", "--json", "--vault"])
        .arg(env.vault())
        .output()
        .unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["in_sync"], false);
    let main = status["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["file"] == "main.js")
        .unwrap()
        .clone();
    assert_eq!(main["state"], "stale");
}

#[test]
fn vault_comes_from_env_var() {
    let env = Env::new();
    env.cmd()
        .env("HOTRELOAD_VAULT", env.vault())
        .args(["install", "--no-helper"])
        .assert()
        .success();
    assert!(env.plugin_dir().join("manifest.json").is_file());
}

#[test]
fn vault_comes_from_config_file() {
    let env = Env::new();
    fs::write(
        env.project.path().join("hotreload.yaml"),
        format!("vault: {}\nhelper: false\n", env.vault().display()),
    )
    .unwrap();
    env.cmd().arg("install").assert().success();
    assert!(env.plugin_dir().join("main.js").is_file());
    assert!(!env.vault().join(".obsidian/plugins/hotreload-helper").exists());
}

#[test]
fn missing_vault_explains_every_source() {
    let env = Env::new();
    env.cmd()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--vault"))
        .stderr(predicate::str::contains("HOTRELOAD_VAULT"))
        .stderr(predicate::str::contains("hotreload.yaml"));
}

#[test]
fn directory_without_dot_obsidian_is_rejected() {
    let env = Env::new();
    let not_a_vault = TempDir::new().unwrap();
    env.cmd()
        .arg("install")
        .arg("--vault")
        .arg(not_a_vault.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(".obsidian"));
}

#[test]
fn helper_command_installs_helper_only() {
    let env = Env::new();
    env.cmd()
        .arg("helper")
        .arg("--vault")
        .arg(env.vault())
        .assert()
        .success()
        .stdout(predicate::str::contains("restart the app"));

    let helper_dir = env.vault().join(".obsidian/plugins/hotreload-helper");
    let manifest = read_json(&helper_dir.join("manifest.json"));
    assert_eq!(manifest["id"], "hotreload-helper");
    assert!(!env.plugin_dir().exists());
}

#[cfg(target_os = "linux")]
#[test]
fn vaults_lists_registered_vaults_as_json() {
    let env = Env::new();
    env.register_vault();

    let output = env.cmd().args(["vaults", "--json"]).output().unwrap();
    assert!(output.status.success());
    let vaults: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(vaults[0]["name"], "Dev Vault");
}

#[cfg(target_os = "linux")]
#[test]
fn vault_can_be_selected_by_name() {
    let env = Env::new();
    env.register_vault();
    env.cmd()
        .args(["install", "--no-helper", "--vault", "Dev Vault"])
        .assert()
        .success();
    assert!(env.plugin_dir().join("main.js").is_file());
}

#[cfg(unix)]
#[test]
fn reload_opens_helper_url_with_configured_opener() {
    let env = Env::new();
    let captured = env.home.path().join("opened-url");
    fs::write(
        env.project.path().join("hotreload.yaml"),
        format!(
            "open_command: [sh, -c, 'printf \"%s\" \"$0\" > {}']\n",
            captured.display()
        ),
    )
    .unwrap();

    env.cmd()
        .arg("reload")
        .arg("--vault")
        .arg(env.vault())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&captured).unwrap(),
        "obsidian://hotreload-helper?vault=Dev%20Vault&id=sample-plugin"
    );
}

#[test]
fn helper_templates_from_config_replace_embedded_main() {
    let env = Env::new();
    let templates = env.project.path().join("helper-templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("main.js.tera"), "// custom {{ id }}\n").unwrap();
    fs::write(
        env.project.path().join("hotreload.yaml"),
        "helper_templates: helper-templates\n",
    )
    .unwrap();

    env.cmd()
        .arg("helper")
        .arg("--vault")
        .arg(env.vault())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(env.vault().join(".obsidian/plugins/hotreload-helper/main.js")).unwrap(),
        "// custom hotreload-helper\n"
    );
}

#[cfg(unix)]
#[test]
fn watch_runs_the_build_before_any_output_exists() {
    let env = Env::new();
    fs::remove_file(env.project.path().join("main.js")).unwrap();
    fs::write(
        env.project.path().join("hotreload.yaml"),
        concat!(
            "output_dir: dist\n",
            "helper: false\n",
            "reload: false\n",
            "debounce_ms: 50\n",
            "build_command: \"sleep 1 && mkdir -p dist && cp manifest.json dist/ && echo built > dist/main.js\"\n",
        ),
    )
    .unwrap();

    let child = env
        .cmd()
        .arg("watch")
        .arg("--vault")
        .arg(env.vault())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let _watch = Running(child);

    assert!(
        wait_for_content(&env.plugin_dir().join("main.js"), "built\n", Duration::from_secs(20)),
        "the build output should be installed once the build writes it"
    );
    assert!(env.project.path().join("dist/manifest.json").is_file());
    assert_eq!(
        read_json(&env.vault().join(".obsidian/community-plugins.json")),
        serde_json::json!(["sample-plugin"])
    );
}
