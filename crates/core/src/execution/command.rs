//! Command and result model
//!
//! A [`Command`] describes one external invocation and a [`CommandResult`] is
//! the write-once outcome of running it. Spawning is blocking and is expected
//! to happen on a blocking thread (see [`crate::execution::CommandExecutor`]).

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command as ProcessCommand, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

/// Exit status synthesized when the executable could not be found
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit status synthesized when the executable could not be run
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Exit status synthesized for any other spawn failure, or a signal exit
pub const EXIT_SPAWN_FAILED: i32 = -1;

/// The two mutually exclusive ways a command line can be written
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandLine {
    /// An argument vector, run directly
    Argv(Vec<String>),
    /// An opaque string handed to `bash -c`
    Shell(String),
}

/// A single command to be run as part of a task
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    line: CommandLine,
    launcher: Vec<String>,
    use_dashname: bool,
}

impl Command {
    /// A command run directly from an argument vector
    pub fn argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line: CommandLine::Argv(argv.into_iter().map(Into::into).collect()),
            launcher: Vec::new(),
            use_dashname: false,
        }
    }

    /// A command run through a shell
    pub fn shell(script: impl Into<String>) -> Self {
        Self {
            line: CommandLine::Shell(script.into()),
            launcher: Vec::new(),
            use_dashname: false,
        }
    }

    /// Split a command string shell-style, or keep it whole when `shell` is set
    pub fn parse(command: &str, shell: bool) -> Option<Self> {
        if shell {
            Some(Self::shell(command))
        } else {
            shlex::split(command).map(Self::argv)
        }
    }

    /// Prefix the rendered command line with a launcher such as `uv run`
    pub fn with_launcher(mut self, launcher: Vec<String>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Same command, but named after its first two tokens
    pub fn with_dashname(&self) -> Self {
        Self {
            use_dashname: true,
            ..self.clone()
        }
    }

    pub fn line(&self) -> &CommandLine {
        &self.line
    }

    pub fn uses_dashname(&self) -> bool {
        self.use_dashname
    }

    /// The first token of the command, e.g. `ruff` for `ruff check .`
    pub fn base_name(&self) -> String {
        self.tokens().into_iter().next().unwrap_or_default()
    }

    /// Display name used by reporters and the name filter
    pub fn name(&self) -> String {
        let tokens = self.tokens();
        if self.use_dashname && tokens.len() > 1 {
            return tokens[..2].join("-");
        }
        tokens.into_iter().next().unwrap_or_default()
    }

    fn tokens(&self) -> Vec<String> {
        match &self.line {
            CommandLine::Argv(argv) => argv.clone(),
            CommandLine::Shell(script) => shlex::split(script)
                .unwrap_or_else(|| script.split_whitespace().map(str::to_string).collect()),
        }
    }

    /// The full argument vector that gets spawned
    pub fn command_line(&self) -> Vec<String> {
        let mut argv = self.launcher.clone();
        match &self.line {
            CommandLine::Argv(args) => argv.extend(args.iter().cloned()),
            CommandLine::Shell(script) => {
                argv.extend(["bash".to_string(), "-c".to_string(), script.clone()])
            }
        }
        argv
    }

    /// The command line quoted for display
    pub fn rendered(&self) -> String {
        let argv = self.command_line();
        shlex::try_join(argv.iter().map(String::as_str)).unwrap_or_else(|_| argv.join(" "))
    }

    /// Run the command to completion in `cwd`.
    ///
    /// With `live` set, the child inherits this process's stdout and stderr
    /// and nothing is captured. Otherwise both streams are merged into one
    /// pipe and returned as the result's output.
    pub fn run(&self, cwd: &Path, live: bool) -> CommandResult {
        debug!("Running command: {}", self.rendered());
        let start = Instant::now();
        match self.spawn_and_wait(cwd, live) {
            Ok((returncode, output)) => {
                CommandResult::new(self.clone(), returncode, start.elapsed(), output)
            }
            Err(e) => {
                let returncode = match e.kind() {
                    io::ErrorKind::NotFound => EXIT_NOT_FOUND,
                    io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
                    _ => EXIT_SPAWN_FAILED,
                };
                let output = format!("Failed to execute command '{}': {}", self.rendered(), e);
                debug!("{}", output);
                CommandResult::new(self.clone(), returncode, start.elapsed(), output)
            }
        }
    }

    fn spawn_and_wait(&self, cwd: &Path, live: bool) -> io::Result<(i32, String)> {
        let argv = self.command_line();
        let Some((program, args)) = argv.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
        };

        let mut process = ProcessCommand::new(program);
        // An activated outer venv must not leak into `uv run`.
        process
            .args(args)
            .current_dir(cwd)
            .env("VIRTUAL_ENV", "")
            .stdin(Stdio::null());

        if live {
            let status = process.status()?;
            return Ok((status.code().unwrap_or(EXIT_SPAWN_FAILED), String::new()));
        }

        let (mut reader, writer) = io::pipe()?;
        process.stdout(writer.try_clone()?).stderr(writer);
        let mut child = process.spawn()?;
        // The write ends live inside `process`; drop them so the read sees EOF.
        drop(process);

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let status = child.wait()?;
        Ok((
            status.code().unwrap_or(EXIT_SPAWN_FAILED),
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }
}

/// Information about a *completed* command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub command: Command,
    /// Index of the command in the list it was started from
    pub position: usize,
    pub returncode: i32,
    pub duration: Duration,
    pub output: String,
}

impl CommandResult {
    pub fn new(command: Command, returncode: i32, duration: Duration, output: String) -> Self {
        Self {
            command,
            position: 0,
            returncode,
            duration,
            output,
        }
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn success(&self) -> bool {
        self.returncode == 0
    }
}
