//! Serial link to the instrument
//!
//! Inbound traffic is a stream of JSON values, compact or pretty-printed,
//! separated by whitespace. Outbound messages are written as one compact
//! JSON line each. The link task keeps the port open, reopening it after
//! errors, and pumps messages between the port and the console.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Deserializer, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, error, info, warn};

use crate::config::SerialConfig;

/// Pending bytes kept while waiting for a value to complete.
const MAX_PENDING: usize = 64 * 1024;

/// Splits a byte stream into JSON values.
///
/// A value may span any number of reads and lines. An incomplete value
/// at the end of the buffer is kept for the next push; a malformed one is
/// reported and skipped up to the end of the offending line.
#[derive(Debug, Default)]
pub struct JsonFramer {
    pending: Vec<u8>,
}

impl JsonFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes and return every value they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<serde_json::Result<Value>> {
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut start = 0;

        while start < self.pending.len() {
            let rest = &self.pending[start..];
            let mut stream = Deserializer::from_slice(rest).into_iter::<Value>();

            match stream.next() {
                Some(Ok(value)) => {
                    start += stream.byte_offset();
                    frames.push(Ok(value));
                }
                Some(Err(e)) if e.is_eof() => break,
                Some(Err(e)) => {
                    start += end_of_line(rest, e.line());
                    frames.push(Err(e));
                }
                // Only whitespace left
                None => start = self.pending.len(),
            }
        }

        self.pending.drain(..start);

        if self.pending.len() > MAX_PENDING {
            warn!(bytes = self.pending.len(), "Discarding oversized partial message");
            self.pending.clear();
        }

        frames
    }

    /// Bytes of an incomplete value still waiting for more input.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Offset just past the newline ending 1-based line `line`, or the end.
fn end_of_line(bytes: &[u8], line: usize) -> usize {
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'\n')
        .nth(line.saturating_sub(1))
        .map_or(bytes.len(), |(i, _)| i + 1)
}

/// Encode a message as one JSON line.
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Read JSON values and forward each one.
///
/// Returns on EOF or when the receiving side is gone.
pub async fn read_messages<R>(mut reader: R, tx: &mpsc::Sender<Value>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut framer = JsonFramer::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = reader
            .read(&mut buf)
            .await
            .context("Failed to read from serial port")?;
        if n == 0 {
            if framer.pending() > 0 {
                debug!(bytes = framer.pending(), "Dropping incomplete message at EOF");
            }
            warn!("Serial port closed (EOF)");
            return Ok(());
        }

        for frame in framer.push(&buf[..n]) {
            match frame {
                Ok(json) => {
                    if tx.send(json).await.is_err() {
                        debug!("Message channel closed, stopping reader");
                        return Ok(());
                    }
                }
                Err(e) => warn!(error = %e, "Failed to parse JSON from serial port"),
            }
        }
    }
}

/// Write queued lines to the device until the queue closes.
pub async fn write_messages<W>(mut writer: W, rx: &mut mpsc::Receiver<String>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write to serial port")?;
        writer.flush().await.context("Failed to flush serial port")?;

        debug!(bytes = line.len(), "Sent to serial port");
    }

    Ok(())
}

/// Keep the serial link alive until either channel closes.
pub async fn run(config: SerialConfig, inbound: mpsc::Sender<Value>, mut outbound: mpsc::Receiver<String>) {
    loop {
        match open(&config) {
            Ok(port) => {
                info!(port = %config.port, baud = config.baud_rate, "Serial port connected");
                let (reader, writer) = tokio::io::split(port);

                tokio::select! {
                    res = read_messages(reader, &inbound) => {
                        if let Err(e) = res {
                            error!(error = %e, "Serial read failed");
                        }
                    }
                    res = write_messages(writer, &mut outbound) => match res {
                        Ok(()) => {
                            info!("Outbound queue closed, stopping serial link");
                            return;
                        }
                        Err(e) => error!(error = %e, "Serial write failed"),
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to open serial port");
            }
        }

        if inbound.is_closed() {
            info!("Console stopped, stopping serial link");
            return;
        }

        info!(delay = ?config.reconnect_delay(), "Reconnecting to serial port");
        sleep(config.reconnect_delay()).await;
    }
}

/// Open the port in raw 8N1 mode at the configured speed.
fn open(config: &SerialConfig) -> Result<SerialStream> {
    tokio_serial::new(&config.port, config.baud_rate)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .open_native_async()
        .with_context(|| format!("Failed to open serial port: {}", config.port))
}
