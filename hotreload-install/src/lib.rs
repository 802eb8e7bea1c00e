//! # hotreload-install
//!
//! Hash-gated atomic artifact copy and install orchestration.
//!
//! Call [`install_plugin`] to copy a plugin's build artifacts into its vault
//! directory, [`install_helper`] to (re)write the reload helper, or
//! [`pipeline::run`] to do both and enable them in one go.

pub mod error;
pub mod hash_store;
pub mod helper;
pub mod pipeline;
pub mod plan;
pub mod status;
pub mod writer;

pub use error::InstallError;
pub use helper::{install_helper, HelperReport};
pub use plan::{ArtifactSpec, InstallPlan};
pub use status::{status, ArtifactStatus, InstallState, StatusReport};
pub use writer::{install_plugin, InstallReport, WriteResult};
