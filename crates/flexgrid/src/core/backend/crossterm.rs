use std::io::{self, Write};

use crossterm::terminal;

use crate::{
    backend::Terminal,
    error::{self, Result},
    geom::Expanse,
};

/// Map IO results into flexgrid errors.
fn translate_result<T>(e: io::Result<T>) -> Result<T> {
    match e {
        Ok(t) => Ok(t),
        Err(e) => Err(error::Error::Terminal(e.to_string())),
    }
}

/// Output stream used by the crossterm terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Stream {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error, leaving stdout free for piping.
    Stderr,
}

/// Crossterm-backed terminal. Sizes come from the controlling terminal, and
/// every write takes the stream lock, writes, and flushes, so concurrent
/// passes never interleave inside one write.
#[derive(Debug, Default)]
pub struct CrosstermTerminal {
    /// Where output goes.
    stream: Stream,
}

impl CrosstermTerminal {
    /// A terminal writing to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A terminal writing to stderr.
    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
        }
    }

    /// Write and flush through a locked handle.
    fn write_to(mut fp: impl Write, out: &str) -> io::Result<()> {
        fp.write_all(out.as_bytes())?;
        fp.flush()
    }
}

impl Terminal for CrosstermTerminal {
    fn size(&self) -> Result<Expanse> {
        let (cols, rows) = translate_result(terminal::size())?;
        Ok(Expanse::from((cols, rows)))
    }

    fn write(&self, out: &str) -> Result<()> {
        translate_result(match self.stream {
            Stream::Stdout => Self::write_to(io::stdout().lock(), out),
            Stream::Stderr => Self::write_to(io::stderr().lock(), out),
        })
    }
}
