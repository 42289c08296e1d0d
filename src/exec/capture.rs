// src/exec/capture.rs

//! How the child's stdout/stderr are wired, and the buffer that collects
//! them when somebody needs the output.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::warn;

/// Output wiring for the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Both streams go to `/dev/null`.
    Discard,
    /// Both streams are combined into one in-memory buffer.
    Capture,
    /// Captured like `Capture` and also copied to our own stdout/stderr.
    Tee,
    /// Child inherits our stdout/stderr; nothing is captured.
    Passthrough,
}

impl OutputMode {
    /// Only buffer output when a consumer (events, failure log) will read it.
    pub fn select(needs_output: bool, passthrough: bool) -> Self {
        match (needs_output, passthrough) {
            (true, true) => OutputMode::Tee,
            (true, false) => OutputMode::Capture,
            (false, true) => OutputMode::Passthrough,
            (false, false) => OutputMode::Discard,
        }
    }

    pub fn captures(self) -> bool {
        matches!(self, OutputMode::Capture | OutputMode::Tee)
    }
}

/// Combined stdout+stderr of one run.
///
/// Both pipe readers append to the same buffer concurrently, so writes are
/// serialised through a mutex; each append is one read chunk.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn append(&self, bytes: &[u8]) {
        self.guard().extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the collected bytes out, leaving the buffer empty.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.guard())
    }

    fn guard(&self) -> MutexGuard<'_, Vec<u8>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Where a pump copies bytes besides the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    None,
    Stdout,
    Stderr,
}

/// Copy `reader` into `sink` until EOF, echoing to our own stream if asked.
///
/// An echo failure only stops the echo; capture continues so the child
/// never blocks on a full pipe.
pub async fn pump<R>(mut reader: R, sink: SharedBuffer, mut echo: Echo) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        let bytes = &chunk[..n];
        sink.append(bytes);

        let echoed = match echo {
            Echo::None => Ok(()),
            Echo::Stdout => write_flush(&mut tokio::io::stdout(), bytes).await,
            Echo::Stderr => write_flush(&mut tokio::io::stderr(), bytes).await,
        };
        if let Err(e) = echoed {
            warn!(error = %e, ?echo, "passthrough write failed; output is still captured");
            echo = Echo::None;
        }
    }
}

async fn write_flush<W>(w: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    w.write_all(bytes).await?;
    w.flush().await
}
