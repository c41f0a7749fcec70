use crate::errors::ExecError;
use crate::external;
use crate::parser::{self, ParsedLine};
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal report `128 + signal`, as POSIX shells do.
/// `-1` stands for a status the platform cannot express as a code.
pub type ExitCode = i32;

/// Where the merged output of a finished command went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    /// Collected text, each line terminated by `\n`.
    Text(String),
    /// Written to this file instead of being collected.
    Redirected(PathBuf),
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub exit_code: ExitCode,
    pub output: Captured,
}

impl Execution {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The single, final result of an execution attempt.
pub type Outcome = Result<Execution, ExecError>;

/// One parsed command line: a program with its arguments and an optional output file.
///
/// A command runs at most once. The first call to [`Command::execute`] stores its
/// outcome, and every later call replays it without starting another process.
///
/// Example
/// ```
/// use last_shell::Command;
/// let cmd = Command::parse("ls -l > listing.txt");
/// assert_eq!(cmd.arguments(), ["ls", "-l"]);
/// assert_eq!(cmd.output_file(), "listing.txt");
/// assert!(!cmd.executed());
/// ```
#[derive(Debug)]
pub struct Command {
    arguments: Vec<String>,
    output_file: String,
    outcome: Option<Outcome>,
}

impl Command {
    /// Build a command from already tokenized arguments.
    ///
    /// An empty `output_file` means the output is captured rather than redirected.
    pub fn new(arguments: Vec<String>, output_file: impl Into<String>) -> Self {
        Self {
            arguments,
            output_file: output_file.into(),
            outcome: None,
        }
    }

    /// Build a command from a raw input line, see [`parser::parse_line`].
    pub fn parse(line: &str) -> Self {
        let ParsedLine {
            arguments,
            output_file,
        } = parser::parse_line(line);
        Self::new(arguments, output_file)
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    /// Arguments joined by single spaces.
    pub fn command_line(&self) -> String {
        self.arguments.join(" ")
    }

    pub fn executed(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Captured text, if the command ran and its output was not redirected.
    pub fn output_text(&self) -> Option<&str> {
        match self.outcome {
            Some(Ok(Execution {
                output: Captured::Text(ref text),
                ..
            })) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Exit code, if the command ran to completion.
    pub fn exit_code(&self) -> Option<ExitCode> {
        match self.outcome {
            Some(Ok(ref execution)) => Some(execution.exit_code),
            _ => None,
        }
    }

    /// `Some(true)` iff the command ran and exited with exactly 0.
    pub fn finished_successfully(&self) -> Option<bool> {
        self.exit_code().map(|code| code == 0)
    }

    /// Run the command once and return its captured output.
    ///
    /// Returns an empty string when the output was redirected to a file.
    /// A non-zero exit status is logged as a warning but still counts as a
    /// completed run. Errors that prevent the command from running are stored
    /// as well, so a failed command is not retried either.
    pub fn execute(&mut self) -> Result<&str, &ExecError> {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.run(),
        };

        match &*self.outcome.insert(outcome) {
            Ok(Execution {
                output: Captured::Text(text),
                ..
            }) => Ok(text.as_str()),
            Ok(_) => Ok(""),
            Err(e) => Err(e),
        }
    }

    fn run(&self) -> Outcome {
        let (program, args) = self
            .arguments
            .split_first()
            .ok_or(ExecError::EmptyCommand)?;
        let output_file = (!self.output_file.is_empty()).then(|| Path::new(&self.output_file));

        let execution = external::run(program, args, output_file)?;
        if !execution.success() {
            log::warn!(
                "command `{}` exited with status {}",
                self.command_line(),
                execution.exit_code
            );
        }
        Ok(execution)
    }
}

impl FromStr for Command {
    type Err = Infallible;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(line))
    }
}

impl fmt::Display for Command {
    /// Multi-line status report, as printed by `last-command`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Command: {}", self.command_line())?;
        writeln!(f, "Parameter count: {}", self.arguments.len())?;

        match &self.outcome {
            None => writeln!(f, "The command has not been executed yet."),
            Some(Err(e)) => writeln!(f, "Execution failed: {e}"),
            Some(Ok(execution)) => {
                writeln!(f, "PID: {}", std::process::id())?;
                match &execution.output {
                    Captured::Text(text) => writeln!(f, "Output: {text}")?,
                    Captured::Redirected(path) => {
                        writeln!(f, "Output: redirected to {}", path.display())?
                    }
                }
                writeln!(f, "Exit code: {}", execution.exit_code)?;
                writeln!(f, "Finished successfully: {}", execution.success())
            }
        }
    }
}
