//! Line transports between the view and its host
//!
//! A transport is a pair of background tasks: a reader producing
//! [`TransportEvent`]s from newline-delimited input, and a writer draining
//! the outbox queue. The view never waits on either.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use startpage_core::prelude::*;
use startpage_core::TransportEvent;

/// Capacity of the inbound event queue
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The view's side of a running transport
#[derive(Debug)]
pub struct Transport {
    outbound_tx: mpsc::UnboundedSender<String>,
    events: mpsc::Receiver<TransportEvent>,
    /// Finishes once every sender is dropped and queued lines are written
    writer: Option<JoinHandle<()>>,
}

impl Transport {
    /// Talk to the host over this process's stdin/stdout.
    ///
    /// Stdin is read on a plain thread so a pending read never holds up
    /// runtime shutdown. Must be called from within a tokio runtime.
    pub fn stdio() -> Self {
        info!("Using stdio transport");
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let writer = tokio::spawn(write_lines(tokio::io::stdout(), outbound_rx));
        std::thread::spawn(move || {
            read_lines_blocking(std::io::stdin().lock(), event_tx);
        });

        Self {
            outbound_tx,
            events,
            writer: Some(writer),
        }
    }

    /// Connect to a host listening on `addr`
    pub async fn connect_tcp(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| Error::transport(format!("failed to connect to {}: {}", addr, e)))?;
        info!("Connected to host at {}", addr);
        let (reader, writer) = stream.into_split();
        Ok(Self::from_io(reader, writer))
    }

    /// Run a transport over any async reader/writer pair
    pub fn from_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let writer = tokio::spawn(write_lines(writer, outbound_rx));
        tokio::spawn(read_lines(reader, event_tx));

        Self {
            outbound_tx,
            events,
            writer: Some(writer),
        }
    }

    /// A transport wired to a [`HostEnd`] in the same process, with no tasks
    pub fn in_memory() -> (Self, HostEnd) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (
            Self {
                outbound_tx,
                events,
                writer: None,
            },
            HostEnd {
                event_tx,
                outbound_rx,
            },
        )
    }

    /// Queue for encoded outbound lines; hand this to the PostOffice
    pub fn line_sender(&self) -> mpsc::UnboundedSender<String> {
        self.outbound_tx.clone()
    }

    /// Wait for the next inbound event. `None` once the reader is gone.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Split into the outbound queue, the inbound events and the writer task
    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<String>,
        mpsc::Receiver<TransportEvent>,
        Option<JoinHandle<()>>,
    ) {
        (self.outbound_tx, self.events, self.writer)
    }
}

/// The host's side of an in-memory transport
#[derive(Debug)]
pub struct HostEnd {
    event_tx: mpsc::Sender<TransportEvent>,
    outbound_rx: mpsc::UnboundedReceiver<String>,
}

impl HostEnd {
    /// Send one raw line to the view
    pub async fn push_line(&self, line: impl Into<String>) -> Result<()> {
        self.event_tx
            .send(TransportEvent::Line(line.into()))
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Close the stream, as a host exiting would
    pub async fn close(&self) -> Result<()> {
        self.event_tx
            .send(TransportEvent::Closed { reason: None })
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Wait for the next line the view sent
    pub async fn recv_line(&mut self) -> Option<String> {
        self.outbound_rx.recv().await
    }

    /// Every line the view has sent so far, without waiting
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.outbound_rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

/// Read newline-delimited input and forward each line as an event.
///
/// Lines that are not valid UTF-8 are logged and skipped; the stream stays
/// open. Always finishes with a single `Closed` event unless the receiver is
/// gone.
pub(crate) async fn read_lines<R>(reader: R, tx: mpsc::Sender<TransportEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    let reason = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break None,
            Ok(_) => {
                let Some(line) = line_from_bytes(&buf) else {
                    continue;
                };
                trace!("recv: {}", line);
                if tx.send(TransportEvent::Line(line)).await.is_err() {
                    debug!("transport event channel closed");
                    return;
                }
            }
            Err(e) => {
                warn!("Transport read failed: {}", e);
                break Some(e.to_string());
            }
        }
    };

    info!("Host closed the stream");
    let _ = tx.send(TransportEvent::Closed { reason }).await;
}

/// Blocking twin of [`read_lines`] for readers that cannot be polled
pub(crate) fn read_lines_blocking<R>(reader: R, tx: mpsc::Sender<TransportEvent>)
where
    R: std::io::BufRead,
{
    let mut reason = None;
    for chunk in reader.split(b'\n') {
        match chunk {
            Ok(bytes) => {
                let Some(line) = line_from_bytes(&bytes) else {
                    continue;
                };
                trace!("recv: {}", line);
                if tx.blocking_send(TransportEvent::Line(line)).is_err() {
                    debug!("transport event channel closed");
                    return;
                }
            }
            Err(e) => {
                warn!("Transport read failed: {}", e);
                reason = Some(e.to_string());
                break;
            }
        }
    }

    info!("Host closed the stream");
    let _ = tx.blocking_send(TransportEvent::Closed { reason });
}

/// Strip the line ending and decode. `None` for bytes that are not UTF-8.
fn line_from_bytes(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(line) => Some(line.to_string()),
        Err(e) => {
            warn!("Skipping inbound line that is not UTF-8: {}", e);
            None
        }
    }
}

/// Write queued lines, one per line, flushing after each
pub(crate) async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        trace!("send: {}", line);

        if let Err(e) = writer.write_all(line.as_bytes()).await {
            error!("Failed to write to host: {}", e);
            break;
        }
        if let Err(e) = writer.write_all(b"\n").await {
            error!("Failed to write newline: {}", e);
            break;
        }
        if let Err(e) = writer.flush().await {
            error!("Failed to flush: {}", e);
            break;
        }
    }

    debug!("transport writer finished");
}
