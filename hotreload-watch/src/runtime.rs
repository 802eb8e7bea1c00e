use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use hotreload_core::types::PluginId;
use hotreload_helper::HELPER_ID;
use hotreload_install::{
    install_helper, install_plugin,
    pipeline::{self, InstallOptions, PipelineResult},
    InstallError, InstallPlan, InstallReport,
};

use crate::debounce::Debouncer;
use crate::defaults::{INSTALL_QUEUE, KILL_GRACE_PERIOD, LIVENESS_POLL};
use crate::error::{io_err, WatchError};
use crate::reload::{open_url, reload_url};
use crate::supervisor::{supervise, BuildOutcome, BuildProcess};

/// Everything the watch loop needs; assembled by the CLI.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Root for hotreload state (`<home>/.hotreload`).
    pub home: PathBuf,
    pub plan: InstallPlan,
    /// Working directory for `build_command`.
    pub project_dir: PathBuf,
    pub debounce: Duration,
    pub reload: bool,
    pub helper: bool,
    /// Directory of `.tera` files replacing the embedded helper templates.
    pub helper_templates: Option<PathBuf>,
    pub build_command: Option<String>,
    pub open_command: Option<Vec<String>>,
}

/// One debounced batch of artifact changes.
#[derive(Debug)]
struct InstallJob {
    paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub plugin: String,
    pub trigger: Vec<String>,
    pub written: usize,
    pub unchanged: usize,
    pub reloaded: bool,
    pub duration_ms: u128,
}

/// Start the watch runtime and block the current thread until it exits.
pub fn start_blocking(opts: WatchOptions) -> Result<(), WatchError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(opts))
}

/// Run until Ctrl-C / SIGTERM, or until the build command fails.
pub async fn run(opts: WatchOptions) -> Result<(), WatchError> {
    run_until(opts, shutdown_signal()).await
}

/// Run until `stop` resolves, or until the build command fails.
pub async fn run_until<F>(opts: WatchOptions, stop: F) -> Result<(), WatchError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let opts = Arc::new(opts);
    let helper_pending_restart = startup(opts.clone()).await;

    let (touch_tx, touch_rx) = mpsc::unbounded_channel::<PathBuf>();
    let (job_tx, job_rx) = mpsc::channel::<InstallJob>(INSTALL_QUEUE);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let opts = opts.clone();
        tokio::spawn(async move {
            let result = watcher_task(opts, touch_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let debounce_handle = {
        let shutdown = shutdown_tx.clone();
        let window = opts.debounce;
        tokio::spawn(async move {
            let result = debounce_task(window, touch_rx, job_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        let opts = opts.clone();
        tokio::spawn(async move {
            let result =
                install_processor_task(opts, job_rx, helper_pending_restart, shutdown.subscribe())
                    .await;
            let _ = shutdown.send(());
            result
        })
    };

    let build_handle = {
        let shutdown = shutdown_tx.clone();
        let opts = opts.clone();
        tokio::spawn(async move {
            let result = build_task(opts, shutdown.subscribe()).await;
            if result.is_err() {
                let _ = shutdown.send(());
            }
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = stop => {
                    tracing::info!("shutdown requested, stopping watch");
                    let _ = shutdown.send(());
                }
            }
            Ok(())
        })
    };

    let (watcher_result, debounce_result, processor_result, build_result, signal_result) = tokio::join!(
        watcher_handle,
        debounce_handle,
        processor_handle,
        build_handle,
        signal_handle
    );

    // Build failures carry the exit code; report them first.
    handle_join("build_supervisor", build_result)?;
    handle_join("watcher", watcher_result)?;
    handle_join("debouncer", debounce_result)?;
    handle_join("install_processor", processor_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

/// What startup did before the tasks were spawned.
enum Startup {
    /// A complete build already existed and was installed.
    Installed(PipelineResult),
    /// No complete build yet; only the helper and the enabled list were touched.
    Waiting { newly_enabled: Vec<PluginId> },
}

/// Helper install, enable, and an initial install when a build already exists.
/// Failures are logged; the loop still starts so the next build can fix them.
///
/// Returns true while a reload would reach a helper the app has not loaded.
async fn startup(opts: Arc<WatchOptions>) -> bool {
    let ready = opts.plan.artifacts_ready();
    let task_opts = opts.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<Startup, InstallError> {
        let opts = task_opts;
        if ready {
            let options = InstallOptions {
                dry_run: false,
                helper: opts.helper,
                helper_templates: opts.helper_templates.clone(),
            };
            pipeline::run(&opts.home, &opts.plan, &options).map(Startup::Installed)
        } else {
            if opts.helper {
                install_helper(
                    &opts.home,
                    &opts.plan.vault,
                    opts.helper_templates.as_deref(),
                    false,
                )?;
            }
            let newly_enabled = pipeline::enable_plugins(&opts.plan, opts.helper)?;
            Ok(Startup::Waiting { newly_enabled })
        }
    })
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "startup task join failure");
            return false;
        }
    };

    match outcome {
        Ok(Startup::Installed(pipeline_result)) => {
            let needs_restart = pipeline_result.helper_needs_restart();
            if needs_restart {
                warn_helper_restart(&opts.plan);
            }
            let report = &pipeline_result.plugin;
            log_report("initial install completed", report);
            if !report.changed() || !opts.reload {
                return needs_restart;
            }
            if !needs_restart {
                trigger_reload(opts.clone()).await;
            }
            false
        }
        Ok(Startup::Waiting { newly_enabled }) => {
            tracing::info!(
                dir = %opts.plan.source_dir.display(),
                "build output incomplete; waiting for the first build",
            );
            let needs_restart = newly_enabled.iter().any(|id| id.as_str() == HELPER_ID);
            if needs_restart {
                warn_helper_restart(&opts.plan);
            }
            needs_restart
        }
        Err(err) => {
            tracing::error!(error = %err, "initial install failed");
            false
        }
    }
}

fn warn_helper_restart(plan: &InstallPlan) {
    tracing::warn!(
        vault = %plan.vault.name,
        "reload helper was just enabled; restart the app once so it can handle reloads",
    );
}

async fn watcher_task(
    opts: Arc<WatchOptions>,
    touch_tx: mpsc::UnboundedSender<PathBuf>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    let source = &opts.plan.source_dir;
    if !source.exists() {
        fs::create_dir_all(source).map_err(|e| io_err(source, e))?;
    }

    // Canonicalize so that FSEvents paths (which arrive as real paths, e.g.
    // /private/var/... on macOS) match the source directory.
    let source = fs::canonicalize(source).unwrap_or_else(|_| source.clone());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(&source, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %source.display(), "watching build output");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                for path in relevant_paths(&event, &opts.plan) {
                    tracing::debug!(path = %path.display(), "artifact touched");
                    if touch_tx.send(path).is_err() {
                        return Err(WatchError::ChannelClosed("debounce queue"));
                    }
                }
            }
        }
    }

    Ok(())
}

async fn debounce_task(
    window: Duration,
    mut touch_rx: mpsc::UnboundedReceiver<PathBuf>,
    job_tx: mpsc::Sender<InstallJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    let mut debouncer = Debouncer::new(window);

    loop {
        let deadline = debouncer.deadline();
        let quiet = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            touched = touch_rx.recv() => {
                let Some(path) = touched else { break };
                debouncer.touch(path, Instant::now());
            }
            _ = quiet => {
                if let Some(paths) = debouncer.fire(Instant::now()) {
                    job_tx
                        .send(InstallJob { paths })
                        .await
                        .map_err(|_| WatchError::ChannelClosed("install queue"))?;
                }
            }
        }
    }

    Ok(())
}

async fn install_processor_task(
    opts: Arc<WatchOptions>,
    mut job_rx: mpsc::Receiver<InstallJob>,
    mut helper_pending_restart: bool,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = job_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let started = Instant::now();

                let task_opts = opts.clone();
                let install_result = tokio::task::spawn_blocking(move || {
                    install_plugin(&task_opts.home, &task_opts.plan, false)
                })
                .await
                .map_err(|err| WatchError::Runtime(format!("install task join error: {err}")))?;

                let report = match install_result {
                    Ok(report) => report,
                    Err(err) => {
                        tracing::error!(error = %err, "debounced install failed");
                        continue;
                    }
                };

                let reloaded = if !report.changed() || !opts.reload {
                    false
                } else if std::mem::take(&mut helper_pending_restart) {
                    tracing::warn!("reload skipped; the helper loads after the app restarts");
                    false
                } else {
                    trigger_reload(opts.clone()).await
                };
                let summary = build_summary(&job, &report, reloaded, started.elapsed());
                tracing::info!(
                    plugin = %summary.plugin,
                    written = summary.written,
                    unchanged = summary.unchanged,
                    reloaded = summary.reloaded,
                    duration_ms = summary.duration_ms,
                    "install completed",
                );
            }
        }
    }

    Ok(())
}

async fn build_task(
    opts: Arc<WatchOptions>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    let Some(command) = opts.build_command.clone() else {
        return Ok(());
    };

    let process = BuildProcess::spawn(&command, &opts.project_dir)?;
    let outcome = supervise(
        process,
        LIVENESS_POLL,
        KILL_GRACE_PERIOD,
        shutdown_rx.resubscribe(),
    )
    .await?;

    match outcome {
        BuildOutcome::Terminated => Ok(()),
        BuildOutcome::Exited(status) if status.success() => {
            // A one-shot build finished; keep watching for manual rebuilds.
            tracing::info!(command = %command, "build command finished");
            let _ = shutdown_rx.recv().await;
            Ok(())
        }
        BuildOutcome::Exited(status) => {
            tracing::error!(command = %command, status = %status, "build command exited");
            Err(WatchError::BuildExited {
                code: status.code(),
            })
        }
    }
}

/// Open the reload URL; returns whether the opener succeeded.
async fn trigger_reload(opts: Arc<WatchOptions>) -> bool {
    let result = tokio::task::spawn_blocking(move || {
        let url = reload_url(&opts.plan.vault.name, opts.plan.plugin_id())?;
        open_url(&url, opts.open_command.as_deref())
    })
    .await;

    match result {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "reload trigger failed");
            false
        }
        Err(err) => {
            tracing::warn!(error = %err, "reload task join failure");
            false
        }
    }
}

fn relevant_paths(event: &Event, plan: &InstallPlan) -> Vec<PathBuf> {
    if !is_relevant_event_kind(&event.kind) {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    event
        .paths
        .iter()
        .filter(|path| plan.is_artifact(path))
        .filter(|path| seen.insert((*path).clone()))
        .cloned()
        .collect()
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn build_summary(
    job: &InstallJob,
    report: &InstallReport,
    reloaded: bool,
    duration: Duration,
) -> InstallSummary {
    InstallSummary {
        plugin: report.plugin_id.to_string(),
        trigger: job
            .paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect(),
        written: report.written_count(),
        unchanged: report.unchanged_count(),
        reloaded,
        duration_ms: duration.as_millis(),
    }
}

fn log_report(message: &str, report: &InstallReport) {
    tracing::info!(
        plugin = %report.plugin_id,
        target = %report.target_dir.display(),
        written = report.written_count(),
        unchanged = report.unchanged_count(),
        "{message}",
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn handle_join(
    task: &str,
    result: Result<Result<(), WatchError>, tokio::task::JoinError>,
) -> Result<(), WatchError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(WatchError::Runtime(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

/// Install the global tracing subscriber (idempotent). `json` switches to
/// one JSON object per line.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    } else {
        let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    }
}
