//! A minimal interactive command shell.
//!
//! Each input line names an external program and its arguments, optionally
//! followed by `> file` to send the output to a file. The program runs with its
//! stderr merged into stdout and the merged output is printed once it exits.
//! The shell keeps the most recently executed [`Command`] so `last-command` can
//! report on it; `exit` or the end of input ends the loop.
//!
//! The main entry point is [`Shell`], which reads lines from any [`LineSource`].
//! [`Command`] can also be used on its own to parse and run a single line.

pub mod cli;
pub mod command;
pub mod errors;
mod external;
pub mod io_adapters;
pub mod parser;
mod shell;

pub use command::{Captured, Command, Execution, ExitCode, Outcome};
pub use errors::ExecError;
pub use io_adapters::{Editor, LineSource, PlainLines};
pub use shell::{DEFAULT_PROMPT, EXIT, LAST_COMMAND, Shell, State};
