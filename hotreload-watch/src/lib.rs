//! Watch runtime: artifact watcher + debouncer + install processor +
//! build supervisor, plus the URL reload trigger.

pub mod debounce;
pub mod defaults;
mod error;
pub mod reload;
mod runtime;
pub mod supervisor;

pub use debounce::Debouncer;
pub use error::WatchError;
pub use reload::{default_open_command, open_url, reload_url};
pub use runtime::{init_tracing, run, run_until, start_blocking, InstallSummary, WatchOptions};
