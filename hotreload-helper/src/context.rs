//! Rendering payload for the helper plugin templates.

use serde::{Deserialize, Serialize};

use hotreload_core::types::PluginId;

use crate::error::RenderError;

/// Plugin id the helper installs under.
pub const HELPER_ID: &str = "hotreload-helper";

/// `obsidian://<action>` the helper listens on.
pub const HELPER_ACTION: &str = "hotreload-helper";

/// Oldest host version exposing `registerObsidianProtocolHandler`.
pub const HELPER_MIN_APP_VERSION: &str = "0.15.0";

/// Everything the helper templates need.
///
/// Contains no timestamps, so rendering the same context twice yields the
/// same bytes and the install hash gate stays quiet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperContext {
    pub id: String,
    pub name: String,
    pub version: String,
    pub min_app_version: String,
    pub action: String,
}

impl Default for HelperContext {
    fn default() -> Self {
        Self {
            id: HELPER_ID.to_string(),
            name: "Hot Reload Helper".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            min_app_version: HELPER_MIN_APP_VERSION.to_string(),
            action: HELPER_ACTION.to_string(),
        }
    }
}

impl HelperContext {
    pub fn plugin_id(&self) -> PluginId {
        PluginId::from(self.id.as_str())
    }

    /// Convert to a [`tera::Context`].
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}
