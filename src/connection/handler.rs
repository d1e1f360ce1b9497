//! Per-client connection driver
//!
//! Every accepted socket is driven by one [`ConnectionHandler`] on its own
//! task. The handler is generic over the stream so tests can feed it
//! scripted I/O instead of a real socket.
//!
//! ## Lifecycle
//!
//! ```text
//! accept ──> ConnectionHandler::new (stats: opened)
//!              │
//!              ▼
//!        ┌─────────────────────────────┐
//!        │ decode whole frames ──> run │◄──┐
//!        │ reply to each in order      │   │ read_buf
//!        │ buffer empty or partial ────┼───┘
//!        └─────────────────────────────┘
//!              │ EOF, QUIT, protocol error or oversized buffer
//!              ▼
//!        run returns (stats: closed)
//! ```
//!
//! ## Buffer Management
//!
//! Incoming data accumulates in a `BytesMut`. TCP is a stream protocol, so
//! one read may hold a partial request or several pipelined ones. A client
//! that buffers more than the configured limit without completing a frame
//! is disconnected.
//!
//! A malformed frame gets a `-ERR Protocol error: ...` reply and then the
//! connection is closed; the decoder never tries to resynchronise.

use crate::commands::CommandHandler;
use crate::protocol::{EncodeError, ParseError, RespParser, RespValue};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Default limit for buffered, not yet decoded input (64 KB)
pub const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Server-wide counters, shared by every connection task.
///
/// All updates are `Relaxed`; the counters are informational and never
/// used to order other memory accesses.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    pub connections_accepted: AtomicU64,
    /// Connections whose handler has not yet returned
    pub active_connections: AtomicU64,
    /// Requests executed, including ones that replied with an error
    pub commands_processed: AtomicU64,
    pub bytes_read: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection over any byte stream.
pub struct ConnectionHandler<S> {
    /// The client stream, buffered for writes
    stream: BufWriter<S>,

    /// Peer address, attached to every log line
    addr: SocketAddr,

    /// Bytes read but not yet decoded
    buffer: BytesMut,

    /// Upper bound on `buffer` before the client is cut off
    max_buffer: usize,

    command_handler: CommandHandler,

    parser: RespParser,

    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler with the default buffer limit.
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            max_buffer: MAX_BUFFER_SIZE,
            command_handler,
            parser: RespParser::new(),
            stats,
        }
    }

    /// Sets the limit on buffered, undecoded input.
    pub fn with_max_buffer(mut self, max_buffer: usize) -> Self {
        self.max_buffer = max_buffer;
        self
    }

    /// Runs the main connection loop until the client goes away, sends
    /// `QUIT`, or breaks the protocol.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;
        match &result {
            Ok(()) => info!(client = %self.addr, "Client sent QUIT"),
            Err(e) if e.is_disconnect() => debug!(client = %self.addr, reason = %e, "Client went away"),
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(request) = self.next_request().await? {
                let quit = CommandHandler::is_quit(&request);
                let response = self.command_handler.execute(request);
                self.stats.command_processed();

                self.send_response(&response).await?;

                if quit && !response.is_error() {
                    return Ok(());
                }
            }

            self.read_more_data().await?;
        }
    }

    /// Decodes the next buffered request. A malformed frame is reported to
    /// the client before the error is returned.
    async fn next_request(&mut self) -> Result<Option<RespValue>, ConnectionError> {
        match self.try_parse_command() {
            Err(ConnectionError::ParseError(e)) => {
                warn!(client = %self.addr, error = %e, "Parse error");
                let reply = RespValue::error(format!("ERR Protocol error: {e}"));
                self.send_response(&reply).await?;
                Err(ConnectionError::ParseError(e))
            }
            other => other,
        }
    }

    /// Attempts to parse a command from the buffer.
    fn try_parse_command(&mut self) -> Result<Option<RespValue>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.parser.parse(&self.buffer)? {
            Some((value, consumed)) => {
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    consumed = consumed,
                    remaining = self.buffer.len(),
                    "Parsed command"
                );
                Ok(Some(value))
            }
            None => {
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete command, need more data"
                );
                Ok(None)
            }
        }
    }

    /// Reads more data from the stream into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= self.max_buffer {
            warn!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial command in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Sends a response to the client. A reply that cannot be framed is
    /// replaced by an error reply.
    async fn send_response(&mut self, response: &RespValue) -> Result<(), ConnectionError> {
        let bytes = match response.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Failed to encode reply");
                RespValue::error("ERR reply could not be encoded").encode()?
            }
        };

        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// RESP parse error
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// A reply could not be framed
    #[error("Encode error: {0}")]
    EncodeError(#[from] EncodeError),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial command)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("Buffer size limit exceeded")]
    BufferFull,
}

impl ConnectionError {
    /// Whether the peer simply closed or reset the connection.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ConnectionError::ClientDisconnected => true,
            ConnectionError::IoError(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

/// Creates a [`ConnectionHandler`] and runs it to completion.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    max_buffer: usize,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Outcomes are already logged by `run`.
    let _ = ConnectionHandler::new(stream, addr, command_handler, stats)
        .with_max_buffer(max_buffer)
        .run()
        .await;
}
