use std::time::Duration;

/// Quiet period after the last artifact write before installing.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// How often the build process is polled for liveness.
pub const LIVENESS_POLL: Duration = Duration::from_secs(1);

/// Time between SIGTERM and SIGKILL when tearing down the build.
pub const KILL_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Capacity of the debounced install queue.
pub const INSTALL_QUEUE: usize = 8;
