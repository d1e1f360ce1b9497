//! Client connections
//!
//! `main.rs` accepts sockets and spawns [`handle_connection`] for each one.
//! The task reads bytes, decodes RESP frames, runs them through the shared
//! [`CommandHandler`](crate::commands::CommandHandler) and writes replies in
//! request order. Any `AsyncRead + AsyncWrite + Unpin` stream can be served.
//!
//! ## Example
//!
//! ```no_run
//! use redkey::commands::CommandHandler;
//! use redkey::connection::{handle_connection, ConnectionStats, MAX_BUFFER_SIZE};
//! use redkey::storage::Database;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! # async fn serve() -> std::io::Result<()> {
//! let listener = TcpListener::bind("127.0.0.1:6379").await?;
//! let handler = CommandHandler::new(Database::new());
//! let stats = Arc::new(ConnectionStats::new());
//!
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, handler, stats, MAX_BUFFER_SIZE));
//! # Ok(())
//! # }
//! ```

pub mod handler;

pub use handler::{
    handle_connection, ConnectionError, ConnectionHandler, ConnectionStats, MAX_BUFFER_SIZE,
};
