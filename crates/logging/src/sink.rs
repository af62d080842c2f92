// crates/logging/src/sink.rs
use std::fs::File;
use std::io::{self, Write};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

use crate::flags::StderrMode;

/// Routes console output by level: with [`StderrMode::Errors`] only
/// warnings and errors go to stderr, everything else to stdout.
#[derive(Clone, Copy, Debug)]
pub struct LogWriter {
    pub mode: StderrMode,
}

pub enum ConsoleWriter {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ConsoleWriter::Stdout(w) => w.write(buf),
            ConsoleWriter::Stderr(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ConsoleWriter::Stdout(w) => w.flush(),
            ConsoleWriter::Stderr(w) => w.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::Stderr(io::stderr())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        match self.mode {
            StderrMode::All => ConsoleWriter::Stderr(io::stderr()),
            StderrMode::Errors if *meta.level() <= Level::WARN => {
                ConsoleWriter::Stderr(io::stderr())
            }
            StderrMode::Errors => ConsoleWriter::Stdout(io::stdout()),
        }
    }
}

/// Appends formatted events to a log file shared by every instance.
pub struct FileWriter {
    pub file: File,
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = FileHandle<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FileHandle { file: &self.file }
    }
}

pub struct FileHandle<'a> {
    file: &'a File,
}

impl Write for FileHandle<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut f = self.file;
        f.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut f = self.file;
        f.flush()
    }
}
