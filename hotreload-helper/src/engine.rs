//! Helper plugin rendering.
//!
//! | File          | Template             | Output          |
//! |---------------|----------------------|-----------------|
//! | Manifest      | `manifest.json.tera` | `manifest.json` |
//! | Main bundle   | `main.js.tera`       | `main.js`       |
//!
//! Output paths are relative to the helper's plugin directory.

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::HelperContext;
use crate::error::RenderError;

/// Every file the helper plugin consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperFile {
    Manifest,
    Main,
}

impl HelperFile {
    /// Install order: the manifest goes first.
    pub fn all() -> &'static [HelperFile] {
        &[HelperFile::Manifest, HelperFile::Main]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            HelperFile::Manifest => "manifest.json.tera",
            HelperFile::Main => "main.js.tera",
        }
    }

    pub fn output_path(&self) -> PathBuf {
        match self {
            HelperFile::Manifest => PathBuf::from("manifest.json"),
            HelperFile::Main => PathBuf::from("main.js"),
        }
    }

    /// Template source compiled into the binary.
    fn embedded(&self) -> &'static str {
        match self {
            HelperFile::Manifest => include_str!("templates/manifest.json.tera"),
            HelperFile::Main => include_str!("templates/main.js.tera"),
        }
    }
}

/// Renders the helper plugin from embedded templates, optionally replaced
/// file by file from an override directory.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        Self::build(None)
    }

    /// Like [`Renderer::new`], but `<dir>/<template_name>` replaces the
    /// embedded template when present. Other files in `dir` are ignored.
    pub fn with_user_templates(dir: &Path) -> Result<Self, RenderError> {
        Self::build(Some(dir))
    }

    fn build(overrides: Option<&Path>) -> Result<Self, RenderError> {
        let mut sources = Vec::with_capacity(HelperFile::all().len());
        for file in HelperFile::all() {
            let source = match overrides.map(|dir| dir.join(file.template_name())) {
                Some(path) if path.is_file() => std::fs::read_to_string(&path)
                    .map_err(|source| RenderError::Io { path, source })?,
                _ => file.embedded().to_string(),
            };
            sources.push((file.template_name(), source));
        }

        let mut tera = Tera::default();
        // JS and JSON output; HTML escaping would corrupt both.
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(sources)?;
        Ok(Self { tera })
    }

    pub fn render_file(&self, ctx: &HelperContext, file: HelperFile) -> Result<String, RenderError> {
        Ok(self.tera.render(file.template_name(), &ctx.to_tera_context()?)?)
    }

    /// `(relative_path, content)` for every helper file, in [`HelperFile::all`] order.
    pub fn render(&self, ctx: &HelperContext) -> Result<Vec<(PathBuf, String)>, RenderError> {
        HelperFile::all()
            .iter()
            .map(|file| Ok((file.output_path(), self.render_file(ctx, *file)?)))
            .collect()
    }
}
