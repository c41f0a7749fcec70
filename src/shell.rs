use crate::command::Command;
use crate::io_adapters::LineSource;
use anyhow::Result;
use std::io::Write;

/// Line that terminates the loop.
pub const EXIT: &str = "exit";
/// Line that prints the summary of the last executed command.
pub const LAST_COMMAND: &str = "last-command";
/// Prompt shown before every read unless configured otherwise.
pub const DEFAULT_PROMPT: &str = "> ";

/// Whether the loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Terminated,
}

/// Interactive read-eval-print loop running one external command per line.
///
/// Command output, notices and summaries go to `out`; launch failures and
/// non-zero exit warnings go to `err`.
/// The most recently executed command is kept for `last-command`.
///
/// Example
/// ```
/// use last_shell::{PlainLines, Shell};
/// let input = PlainLines::new("last-command\nexit\n".as_bytes());
/// let mut out = Vec::new();
/// let mut shell = Shell::new(input, &mut out, std::io::sink());
/// shell.run().unwrap();
/// drop(shell);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "> No command has been executed yet.\n> "
/// );
/// ```
pub struct Shell<L, O, E> {
    input: L,
    out: O,
    err: E,
    prompt: String,
    state: State,
    last: Option<Command>,
}

impl<L: LineSource, O: Write, E: Write> Shell<L, O, E> {
    pub fn new(input: L, out: O, err: E) -> Self {
        Self {
            input,
            out,
            err,
            prompt: DEFAULT_PROMPT.to_string(),
            state: State::Running,
            last: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The most recently executed command, if any.
    pub fn last_command(&self) -> Option<&Command> {
        self.last.as_ref()
    }

    /// Read and handle lines until `exit` or the end of input.
    ///
    /// Commands never stop the loop; only failures of the shell's own input or
    /// output are returned.
    pub fn run(&mut self) -> Result<()> {
        while self.state == State::Running {
            match self.input.read_line(&self.prompt, &mut self.out)? {
                None => self.state = State::Terminated,
                Some(line) => self.handle_line(&line)?,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Handle one input line.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        match line {
            EXIT => {
                log::debug!("exit requested");
                self.state = State::Terminated;
            }
            LAST_COMMAND => self.print_last_command()?,
            _ => self.run_command(line)?,
        }
        Ok(())
    }

    fn print_last_command(&mut self) -> Result<()> {
        match &self.last {
            Some(command) => write!(self.out, "Last executed command:\n{command}")?,
            None => writeln!(self.out, "No command has been executed yet.")?,
        }
        Ok(())
    }

    fn run_command(&mut self, line: &str) -> Result<()> {
        let mut command = Command::parse(line);
        match command.execute() {
            Ok("") => writeln!(self.out, "Output redirected.")?,
            Ok(text) => write!(self.out, "Execution result:\n{text}")?,
            Err(e) => {
                log::debug!("{e:?}");
                writeln!(self.err, "error: {e}")?;
            }
        }
        if let Some(code) = command.exit_code().filter(|&code| code != 0) {
            writeln!(self.err, "warning: command exited with status {code}")?;
        }
        self.last = Some(command);
        Ok(())
    }
}
