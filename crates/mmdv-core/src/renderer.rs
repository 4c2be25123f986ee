//! # Mermaid CLI Renderer
//!
//! Runs the external renderer (`mmdc`) as a subprocess:
//!
//! ```text
//! <program> -i <input.mmd> -o <output.svg> -p <puppeteer-config.json>
//! ```
//!
//! Only the exit status and captured standard error are consumed. The
//! rendered SVG is never read.
//!
//! ## Timeout
//!
//! The wait is bounded by [`RendererConfig::timeout`]. On expiry the child
//! is killed and reaped before returning. The child is also spawned with
//! `kill_on_drop`, which covers the request future being dropped.
//!
//! On unix the renderer leads its own process group. `mmdc` launches a
//! headless browser as a grandchild, which killing the direct child would
//! orphan, so timeouts and dropped renders signal the whole group.
//!
//! Captured stderr is capped at [`STDERR_LIMIT`] bytes. Anything past the
//! cap is read and discarded so the renderer never blocks on a full pipe.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};

use crate::error::RenderFailure;

/// Default renderer program, relative to the working directory.
pub const DEFAULT_PROGRAM: &str = "./node_modules/.bin/mmdc";

/// Default browser-automation configuration file passed with `-p`.
pub const DEFAULT_PUPPETEER_CONFIG: &str = "puppeteer-config.json";

/// Default wall-clock budget for one render.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Most stderr bytes kept from one render.
pub const STDERR_LIMIT: u64 = 1024 * 1024;

/// How the renderer is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Renderer executable.
    pub program: PathBuf,
    /// Browser-automation configuration file.
    pub puppeteer_config: PathBuf,
    /// Hard limit on one render, after which the child is killed.
    pub timeout: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            puppeteer_config: PathBuf::from(DEFAULT_PUPPETEER_CONFIG),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Subprocess-backed renderer.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    config: RendererConfig,
}

impl MermaidCli {
    /// Create a renderer with the given invocation settings.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// The invocation settings.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    fn program_name(&self) -> String {
        self.config.program.display().to_string()
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("-p")
            .arg(&self.config.puppeteer_config)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    /// Render `input` into `output`.
    ///
    /// `Ok(())` means the renderer exited with status zero. Every other
    /// outcome is a [`RenderFailure`].
    pub async fn render(&self, input: &Path, output: &Path) -> Result<(), RenderFailure> {
        let started = Instant::now();
        let mut child = self
            .command(input, output)
            .spawn()
            .map_err(|source| RenderFailure::Spawn {
                program: self.program_name(),
                source,
            })?;

        // Declared after `child` so it drops first, while the group leader
        // is still unreaped.
        let mut group = ProcessGroup::of(&child);

        // Drain stderr concurrently so a chatty renderer cannot block on a
        // full pipe while we wait for it to exit.
        let stderr_task = child.stderr.take().map(|pipe| tokio::spawn(drain_stderr(pipe)));

        let waited = tokio::time::timeout(self.config.timeout, child.wait()).await;
        let elapsed = started.elapsed();
        metrics::histogram!("mmdv_render_duration_seconds").record(elapsed.as_secs_f64());

        match waited {
            Ok(Ok(status)) => {
                group.release();
                let stderr = collect_stderr(stderr_task).await;
                if status.success() {
                    tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "render succeeded");
                    Ok(())
                } else {
                    tracing::debug!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        %status,
                        "renderer rejected diagram"
                    );
                    Err(RenderFailure::Exited {
                        program: self.program_name(),
                        status,
                        stderr,
                    })
                }
            }
            Ok(Err(source)) => {
                group.kill();
                terminate(&mut child).await;
                Err(RenderFailure::Wait {
                    program: self.program_name(),
                    source,
                })
            }
            Err(_) => {
                group.kill();
                terminate(&mut child).await;
                let stderr = collect_stderr(stderr_task).await;
                metrics::counter!("mmdv_render_timeouts_total").increment(1);
                tracing::warn!(
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "renderer timed out; child killed"
                );
                Err(RenderFailure::TimedOut {
                    program: self.program_name(),
                    timeout: self.config.timeout,
                    stderr,
                })
            }
        }
    }
}

/// The renderer's process group, killed on drop unless released.
///
/// The group id is the renderer's pid, which stays reserved until the
/// renderer is reaped. Release the guard once `wait` has reaped it.
#[derive(Debug)]
struct ProcessGroup {
    #[cfg(unix)]
    leader: Option<nix::unistd::Pid>,
}

impl ProcessGroup {
    #[cfg(unix)]
    fn of(child: &Child) -> Self {
        let leader = child
            .id()
            .and_then(|pid| i32::try_from(pid).ok())
            .map(nix::unistd::Pid::from_raw);
        Self { leader }
    }

    #[cfg(not(unix))]
    fn of(_child: &Child) -> Self {
        Self {}
    }

    /// SIGKILL every process in the group. Only the first call signals.
    fn kill(&mut self) {
        #[cfg(unix)]
        if let Some(leader) = self.leader.take() {
            use nix::sys::signal::{killpg, Signal};
            if let Err(e) = killpg(leader, Signal::SIGKILL) {
                if e != nix::errno::Errno::ESRCH {
                    tracing::warn!(error = %e, "failed to kill renderer process group");
                }
            }
        }
    }

    /// Forget the group without signalling it.
    fn release(&mut self) {
        #[cfg(unix)]
        {
            self.leader = None;
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Read up to [`STDERR_LIMIT`] bytes, then discard the rest until EOF.
async fn drain_stderr(mut pipe: ChildStderr) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Err(e) = (&mut pipe).take(STDERR_LIMIT).read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "reading renderer stderr failed");
        return buf;
    }
    if let Err(e) = tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await {
        tracing::debug!(error = %e, "discarding renderer stderr failed");
    }
    buf
}

/// Kill the child and reap it.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill renderer");
    }
}

/// Join the stderr reader. Grandchildren that inherited the pipe can keep it
/// open after the renderer dies, so the join is bounded too.
async fn collect_stderr(task: Option<tokio::task::JoinHandle<Vec<u8>>>) -> String {
    const STDERR_GRACE: Duration = Duration::from_millis(500);

    let Some(mut task) = task else {
        return String::new();
    };
    match tokio::time::timeout(STDERR_GRACE, &mut task).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            task.abort();
            String::new()
        }
    }
}
