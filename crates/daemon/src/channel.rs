// crates/daemon/src/channel.rs
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::OwnedFd;

#[cfg(test)]
use nix::errno::Errno;

/// Byte written once by every daemon that detached successfully.
pub const SENTINEL: u8 = 0xff;

/// Outcome of a single read on the consumer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recv {
    /// One well-formed sentinel byte.
    Sentinel,
    /// One byte with an unexpected value; never counted.
    Malformed(u8),
    /// The write end is closed in every process of the lineage.
    Closed,
}

/// Read end of the synchronization channel, owned by the orchestrator.
#[derive(Debug)]
pub struct SentinelReader {
    file: File,
}

/// Write end of the synchronization channel, owned by the worker lineage.
#[derive(Debug)]
pub struct SentinelWriter {
    file: File,
}

/// Creates the one-directional sentinel pipe.
///
/// Both ends are closed when dropped, so every exit path of the orchestrator
/// and of the daemonizer releases them.
pub fn channel() -> nix::Result<(SentinelReader, SentinelWriter)> {
    let (rd, wr) = pipe()?;
    Ok((
        SentinelReader {
            file: File::from(rd),
        },
        SentinelWriter {
            file: File::from(wr),
        },
    ))
}

fn pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    #[cfg(test)]
    if let Some(errno) = MOCK_PIPE_ERR.with(|m| m.borrow_mut().take()) {
        return Err(errno);
    }
    nix::unistd::pipe()
}

#[cfg(test)]
thread_local! {
    static MOCK_PIPE_ERR: std::cell::RefCell<Option<Errno>> = const { std::cell::RefCell::new(None) };
}

#[cfg(test)]
pub(crate) fn mock_pipe_failure(errno: Errno) {
    MOCK_PIPE_ERR.with(|m| *m.borrow_mut() = Some(errno));
}

impl SentinelReader {
    /// Reads exactly one byte.
    ///
    /// `Interrupted` errors are returned to the caller so it can re-check its
    /// stop condition before reading again.
    pub fn recv(&mut self) -> io::Result<Recv> {
        let mut buf = [0u8; 1];
        match self.file.read(&mut buf)? {
            0 => Ok(Recv::Closed),
            _ if buf[0] == SENTINEL => Ok(Recv::Sentinel),
            _ => Ok(Recv::Malformed(buf[0])),
        }
    }
}

impl SentinelWriter {
    /// Announces one detached daemon with a single one-byte write.
    ///
    /// A short or failed write is reported as an error and never retried.
    pub fn signal(&mut self) -> io::Result<()> {
        match self.file.write(&[SENTINEL]) {
            Ok(1) => Ok(()),
            Ok(_) => Err(io::Error::from(io::ErrorKind::WriteZero)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sentinel_roundtrip() {
        let (mut rd, mut wr) = channel().unwrap();
        wr.signal().unwrap();
        wr.signal().unwrap();
        assert_eq!(rd.recv().unwrap(), Recv::Sentinel);
        assert_eq!(rd.recv().unwrap(), Recv::Sentinel);
        drop(wr);
        assert_eq!(rd.recv().unwrap(), Recv::Closed);
    }

    #[test]
    fn other_bytes_are_malformed() {
        let (mut rd, mut wr) = channel().unwrap();
        wr.file.write_all(&[0x01, SENTINEL]).unwrap();
        drop(wr);
        assert_eq!(rd.recv().unwrap(), Recv::Malformed(0x01));
        assert_eq!(rd.recv().unwrap(), Recv::Sentinel);
        assert_eq!(rd.recv().unwrap(), Recv::Closed);
    }

    #[test]
    fn signal_fails_once_reader_is_gone() {
        let (rd, mut wr) = channel().unwrap();
        drop(rd);
        let err = wr.signal().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn mocked_pipe_failure() {
        mock_pipe_failure(Errno::EMFILE);
        assert_eq!(channel().unwrap_err(), Errno::EMFILE);
        assert!(channel().is_ok());
    }
}
