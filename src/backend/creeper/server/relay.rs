//! Forwarding of server output to the terminal.

use console::style;
use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const CHUNK_SIZE: usize = 8 * 1024;

/// Detects a marker in a byte stream, even when it is split across chunks.
pub struct ReadinessWatch {
    marker: Vec<u8>,
    tail: Vec<u8>,
    fired: bool,
}

impl ReadinessWatch {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.as_bytes().to_vec(),
            tail: Vec::new(),
            fired: false,
        }
    }

    /// Returns `true` for the chunk that completes the first occurrence of
    /// the marker and `false` for everything else, before and after.
    pub fn observe(&mut self, chunk: &[u8]) -> bool {
        if self.fired {
            return false;
        }

        let mut window = std::mem::take(&mut self.tail);
        window.extend_from_slice(chunk);

        if window
            .windows(self.marker.len().max(1))
            .any(|w| w == self.marker.as_slice())
        {
            self.fired = true;
            return true;
        }

        let keep = self.marker.len().saturating_sub(1).min(window.len());
        self.tail = window.split_off(window.len() - keep);
        false
    }
}

/// Readiness detection for the stdout relay.
pub struct Readiness {
    pub watch: ReadinessWatch,
    pub announcement: String,
}

impl Readiness {
    pub fn new(marker: &str, public_address: &str) -> Self {
        Self {
            watch: ReadinessWatch::new(marker),
            announcement: announcement(public_address),
        }
    }
}

pub fn announcement(public_address: &str) -> String {
    let line = format!("Server started. Your server address is: {public_address}");
    style(line).black().on_green().to_string()
}

/// Copies `source` to `sink` chunk by chunk, unmodified, until EOF.
///
/// When `readiness` is given, its announcement is written on a line of its
/// own right after the chunk that completes the marker. Returns the number
/// of bytes relayed from `source`.
pub async fn relay<R, W>(
    mut source: R,
    mut sink: W,
    mut readiness: Option<Readiness>,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut relayed = 0u64;

    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let chunk = &buf[..n];
        sink.write_all(chunk).await?;
        relayed += n as u64;

        if let Some(readiness) = readiness.as_mut() {
            if readiness.watch.observe(chunk) {
                if !chunk.ends_with(b"\n") {
                    sink.write_all(b"\n").await?;
                }
                sink.write_all(readiness.announcement.as_bytes()).await?;
                sink.write_all(b"\n").await?;
            }
        }
        sink.flush().await?;
    }

    Ok(relayed)
}
