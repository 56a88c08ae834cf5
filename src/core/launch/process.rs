use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::events::LaunchSink;
use super::failure::detect_diagnostic;
use crate::core::error::{LauncherError, LauncherResult};

/// Lines of game output kept for failure reports.
const OUTPUT_TAIL: usize = 200;

const KILL_GRACE: Duration = Duration::from_secs(5);

/// Run the game command in `game_dir` until it exits.
///
/// stdout and stderr are merged line by line into `Log` events and the
/// `game` log target. A non-zero exit becomes `GameProcess` with the tail of
/// the output; cancellation kills the process and returns `Cancelled`.
pub async fn run_game(command: &[String], game_dir: &Path, sink: &LaunchSink) -> LauncherResult<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| LauncherError::Other("Launch command is empty".into()))?;
    let program = resolve_program(program);

    let mut cmd = Command::new(&program);
    cmd.args(args)
        .current_dir(game_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    configure_platform_spawn(&mut cmd);

    info!("Launching game with {}", program);
    debug!("Command (copy/paste): {}", format_command_for_logs(&program, args));

    let mut child = cmd.spawn().map_err(|source| LauncherError::JavaExecution {
        path: PathBuf::from(&program),
        source,
    })?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    drop(tx);

    let cancel = sink.cancel_token().clone();
    let mut output = OutputCapture::default();

    // Both pipes closed means the process is exiting.
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => None,
            line = rx.recv() => Some(line),
        };
        match line {
            None => return stop(&mut child).await,
            Some(Some(line)) => {
                info!(target: "game", "{}", line);
                output.push(&line);
                sink.log(line);
            }
            Some(None) => break,
        }
    }

    let waited = tokio::select! {
        _ = cancel.cancelled() => None,
        status = child.wait() => Some(status),
    };
    let Some(status) = waited else {
        return stop(&mut child).await;
    };
    let status = status.map_err(|e| LauncherError::io(game_dir, e))?;

    if status.success() {
        info!("Game exited normally");
        return Ok(());
    }

    let exit_code = status.code().unwrap_or(-1);
    warn!("Game exited with code {}", exit_code);
    Err(LauncherError::GameProcess {
        exit_code,
        output: output.into_text(),
    })
}

async fn forward_lines(stream: impl AsyncRead + Unpin, tx: mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Error reading game output: {}", e);
                break;
            }
        }
    }
}

async fn stop(child: &mut Child) -> LauncherResult<()> {
    info!("Stopping game process");
    if let Err(e) = child.start_kill() {
        warn!("Could not kill game process: {}", e);
    }
    match tokio::time::timeout(KILL_GRACE, child.wait()).await {
        Ok(Ok(status)) => debug!("Game process stopped ({})", status),
        Ok(Err(e)) => warn!("Error waiting for game process: {}", e),
        Err(_) => warn!("Game process still running after {:?}", KILL_GRACE),
    }
    Err(LauncherError::Cancelled)
}

/// Last lines of output, plus any diagnostic line that scrolled out.
#[derive(Default)]
struct OutputCapture {
    diagnostics: Vec<String>,
    tail: VecDeque<String>,
}

impl OutputCapture {
    fn push(&mut self, line: &str) {
        self.tail.push_back(line.to_string());
        if self.tail.len() > OUTPUT_TAIL {
            if let Some(old) = self.tail.pop_front() {
                if detect_diagnostic(&old).is_some() {
                    self.diagnostics.push(old);
                }
            }
        }
    }

    fn into_text(self) -> String {
        self.diagnostics
            .into_iter()
            .chain(self.tail)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ── Platform ────────────────────────────────────────

fn resolve_program(program: &str) -> String {
    #[cfg(target_os = "windows")]
    if let Some(javaw) = windowless_variant(program) {
        if javaw.exists() {
            return javaw.to_string_lossy().into_owned();
        }
    }
    program.to_string()
}

/// `javaw.exe` in place of `java.exe`; it starts without a console window.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn windowless_variant(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    let is_java = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().eq_ignore_ascii_case("java.exe"));
    is_java.then(|| path.with_file_name("javaw.exe"))
}

#[cfg_attr(not(target_os = "windows"), allow(unused_variables))]
fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);

        // Terminal variables make LWJGL treat the game as a console session.
        cmd.env_remove("WT_SESSION");
        cmd.env_remove("TERM");
        cmd.env_remove("ConEmuANSI");
    }
}

fn format_command_for_logs(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(shell_escape)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
