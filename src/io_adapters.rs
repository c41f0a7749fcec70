use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// Source of input lines for the shell loop.
///
/// `read_line` shows `prompt` (either itself or by writing it to `out`) and
/// returns the next line without its terminator, or `None` when input is over.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>>;
}

/// Interactive line editor backed by rustyline.
///
/// Lines are kept in the editor's in-memory recall history. Ctrl-D ends the
/// input; Ctrl-C discards the line being edited and prompts again.
pub struct Editor {
    inner: DefaultEditor,
}

impl Editor {
    pub fn new() -> Result<Self> {
        let inner = DefaultEditor::new().context("can't initialize line editor")?;
        Ok(Self { inner })
    }
}

/// What the editor should do after one `readline` call.
#[derive(Debug, PartialEq, Eq)]
enum Edited {
    Line(String),
    Discarded,
    End,
}

fn classify(result: rustyline::Result<String>) -> Result<Edited> {
    match result {
        Ok(line) => Ok(Edited::Line(line)),
        Err(ReadlineError::Interrupted) => {
            log::debug!("line discarded");
            Ok(Edited::Discarded)
        }
        Err(ReadlineError::Eof) => {
            log::debug!("end of input");
            Ok(Edited::End)
        }
        Err(err) => Err(err).context("can't read line"),
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str, _out: &mut dyn Write) -> Result<Option<String>> {
        loop {
            match classify(self.inner.readline(prompt))? {
                Edited::Line(line) => {
                    if !line.trim().is_empty() {
                        self.inner.add_history_entry(line.as_str())?;
                    }
                    return Ok(Some(line));
                }
                Edited::Discarded => continue,
                Edited::End => return Ok(None),
            }
        }
    }
}

/// Plain buffered reader, used when stdin is not a terminal and in tests.
pub struct PlainLines<R> {
    reader: R,
}

impl<R: BufRead> PlainLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PlainLines<R> {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>> {
        write!(out, "{prompt}")?;
        out.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).context("can't read line")? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}
