use crate::engine::config::MinimizationConfig;
use crate::engine::error::MinimizationError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Asynchronous events from the external engine.
///
/// Stdout and stderr are delivered as complete lines; `Exited` fires exactly
/// once when the child terminates, carrying its exit code (or `None` if it was
/// killed by a signal or torn down by `stop`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Stdout(String),
    Stderr(String),
    Exited(Option<i32>),
}

/// A fully resolved engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl EngineCommand {
    /// Builds the minimization invocation for a run: mode, hydrogen handling,
    /// log flush interval, step count, force field, the three file paths, and
    /// the optional steepest-descent switch. On Windows the engine also needs
    /// its bundled `data` directory named explicitly.
    pub fn minimize(
        config: &MinimizationConfig,
        input: &Path,
        constraints: &Path,
        output: &Path,
    ) -> Self {
        let exe = if cfg!(windows) {
            "nanobabel.exe"
        } else {
            "nanobabel"
        };
        let mut args = vec![
            "minimize".to_string(),
            "-h".to_string(),
            "-l".to_string(),
            config.log_interval.to_string(),
            "-n".to_string(),
            config.steps.to_string(),
            "-ff".to_string(),
            config.forcefield.token().to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-cx".to_string(),
            constraints.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        if cfg!(windows) {
            args.push("-dd".to_string());
            args.push("data".to_string());
        }
        if config.steepest_descent {
            args.push("-sd".to_string());
        }
        Self {
            program: config.engine_dir.join(exe),
            args,
            cwd: Some(config.engine_dir.clone()),
        }
    }
}

/// Reassembles a byte stream into complete lines.
///
/// Pipe reads are not aligned to line boundaries, so a partial tail is carried
/// across calls and only complete lines are handed out. `flush` surfaces
/// whatever is left at end of stream.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.pending, rest);
            line.pop(); // the '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

/// Launches and monitors the external engine.
///
/// `start` spawns the child with piped stdio and hands back a receiver of
/// [`EngineEvent`]s; dedicated tasks drain stdout and stderr incrementally so
/// trajectory frames are visible while the engine is still running (the engine
/// streams output continuously, it cannot be read to completion after exit).
/// All pipeline state stays on the consumer side: the tasks only post onto the
/// event channel.
#[derive(Debug, Default)]
pub struct EngineSupervisor {
    kill_tx: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the engine. A missing or unrunnable executable is fatal and
    /// reported immediately; there is no retry.
    pub fn start(
        &mut self,
        command: &EngineCommand,
    ) -> Result<mpsc::UnboundedReceiver<EngineEvent>, MinimizationError> {
        debug!(program = %command.program.display(), args = ?command.args, "launching engine");

        let mut builder = Command::new(&command.program);
        builder
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &command.cwd {
            builder.current_dir(cwd);
        }

        let mut child = builder.spawn().map_err(|source| MinimizationError::Launch {
            program: command.program.clone(),
            source,
        })?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);

        if let Some(stdout) = child.stdout.take() {
            self.tasks.push(spawn_line_reader(stdout, {
                let tx = events_tx.clone();
                move |line| tx.send(EngineEvent::Stdout(line)).is_ok()
            }));
        }
        if let Some(stderr) = child.stderr.take() {
            self.tasks.push(spawn_line_reader(stderr, {
                let tx = events_tx.clone();
                move |line| tx.send(EngineEvent::Stderr(line)).is_ok()
            }));
        }

        // The waiter owns the child. On a kill request it terminates the child
        // first; if the whole task is aborted instead, kill_on_drop covers it.
        self.tasks.push(tokio::spawn(async move {
            let mut kill_rx = kill_rx;
            let code = tokio::select! {
                status = child.wait() => status.ok().and_then(|s| s.code()),
                _ = kill_rx.changed() => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    None
                }
            };
            let _ = events_tx.send(EngineEvent::Exited(code));
        }));

        self.kill_tx = Some(kill_tx);
        Ok(events_rx)
    }

    /// Requests termination of a still-running child and detaches all event
    /// delivery. Idempotent, and safe to call whether or not `start` ever ran
    /// or succeeded; after it returns no further events are observed.
    pub fn stop(&mut self) {
        if let Some(kill_tx) = self.kill_tx.take() {
            let _ = kill_tx.send(true);
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for EngineSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_line_reader<R>(mut reader: R, mut forward: impl FnMut(String) -> bool + Send + 'static) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut assembler = LineAssembler::default();
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    for line in assembler.push(&buf[..n]) {
                        if !forward(line) {
                            return;
                        }
                    }
                }
            }
        }
        if let Some(line) = assembler.flush() {
            forward(line);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{ForceField, MinimizationConfigBuilder};

    #[test]
    fn assembler_joins_chunks_split_mid_line() {
        let mut assembler = LineAssembler::default();
        assert!(assembler.push(b"Step update ").is_empty());
        let lines = assembler.push(b"start\nLINE1\nStep upd");
        assert_eq!(lines, vec!["Step update start", "LINE1"]);
        let lines = assembler.push(b"ate end\n");
        assert_eq!(lines, vec!["Step update end"]);
        assert!(assembler.flush().is_none());
    }

    #[test]
    fn assembler_strips_carriage_returns() {
        let mut assembler = LineAssembler::default();
        assert_eq!(assembler.push(b"abc\r\ndef\n"), vec!["abc", "def"]);
    }

    #[test]
    fn assembler_flushes_trailing_partial_line() {
        let mut assembler = LineAssembler::default();
        assert!(assembler.push(b"no newline").is_empty());
        assert_eq!(assembler.flush(), Some("no newline".to_string()));
        assert!(assembler.flush().is_none());
    }

    #[test]
    fn chunk_boundaries_do_not_change_line_sequence() {
        let text = b"alpha\nbeta\ngamma\ndelta\n";
        let whole = {
            let mut a = LineAssembler::default();
            a.push(text)
        };
        for split in 0..text.len() {
            let mut a = LineAssembler::default();
            let mut lines = a.push(&text[..split]);
            lines.extend(a.push(&text[split..]));
            assert_eq!(lines, whole, "split at {split}");
        }
    }

    #[test]
    fn minimize_command_encodes_run_parameters() {
        let config = MinimizationConfigBuilder::new()
            .engine_dir(PathBuf::from("/opt/nanobabel"))
            .forcefield(ForceField::Mmff94)
            .steps(1000)
            .steepest_descent(true)
            .build()
            .unwrap();
        let cmd = EngineCommand::minimize(
            &config,
            Path::new("/tmp/in.sdf"),
            Path::new("/tmp/cx.txt"),
            Path::new("/tmp/out.pdb"),
        );

        assert_eq!(cmd.cwd.as_deref(), Some(Path::new("/opt/nanobabel")));
        assert_eq!(cmd.args[0], "minimize");
        let joined = cmd.args.join(" ");
        assert!(joined.contains("-n 1000"));
        assert!(joined.contains("-ff MMFF94"));
        assert!(joined.contains("-i /tmp/in.sdf"));
        assert!(joined.contains("-cx /tmp/cx.txt"));
        assert!(joined.contains("-o /tmp/out.pdb"));
        assert!(joined.ends_with("-sd"));
    }

    #[test]
    fn minimize_command_omits_sd_by_default() {
        let config = MinimizationConfigBuilder::new()
            .engine_dir(PathBuf::from("/opt/nanobabel"))
            .build()
            .unwrap();
        let cmd = EngineCommand::minimize(
            &config,
            Path::new("in"),
            Path::new("cx"),
            Path::new("out"),
        );
        assert!(!cmd.args.contains(&"-sd".to_string()));
    }

    #[tokio::test]
    async fn launch_failure_is_fatal_and_reported() {
        let mut supervisor = EngineSupervisor::new();
        let command = EngineCommand {
            program: PathBuf::from("/nonexistent/engine-binary"),
            args: vec![],
            cwd: None,
        };
        let err = supervisor.start(&command).unwrap_err();
        assert!(matches!(err, MinimizationError::Launch { .. }));
        // stop() must be safe even though nothing was started.
        supervisor.stop();
        supervisor.stop();
    }

    #[tokio::test]
    async fn child_output_and_exit_are_delivered() {
        let mut supervisor = EngineSupervisor::new();
        let command = EngineCommand {
            program: PathBuf::from("/bin/sh"),
            args: vec![
                "-c".to_string(),
                "printf 'one\\ntwo\\n'; printf 'oops\\n' >&2; exit 3".to_string(),
            ],
            cwd: None,
        };
        let mut events = supervisor.start(&command).unwrap();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit = None;
        // Drain until the channel closes; Exited may be interleaved before the
        // last output lines, since readers and the waiter are separate tasks.
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::Stdout(line) => stdout.push(line),
                EngineEvent::Stderr(line) => stderr.push(line),
                EngineEvent::Exited(code) => exit = Some(code),
            }
        }
        assert_eq!(stdout, vec!["one", "two"]);
        assert_eq!(stderr, vec!["oops"]);
        assert_eq!(exit, Some(Some(3)));
    }

    #[tokio::test]
    async fn stop_detaches_event_delivery() {
        let mut supervisor = EngineSupervisor::new();
        let command = EngineCommand {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "sleep 30".to_string()],
            cwd: None,
        };
        let mut events = supervisor.start(&command).unwrap();
        supervisor.stop();

        // All producer tasks are gone, so the channel drains and closes
        // without an Exited event sneaking in after stop().
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while let Some(event) = events.recv().await {
                assert!(!matches!(event, EngineEvent::Exited(_)));
            }
        })
        .await
        .expect("event channel should close after stop()");
    }
}
