//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{Result, SnapError};
use crate::protocol::{read_request, write_response, Response};
use crate::storage::Storage;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Serve one request and close
    ///
    /// Client hang-ups and timeouts end the connection quietly; malformed
    /// requests get a 400.
    pub fn handle<S: Storage>(&mut self, engine: &Engine<S>) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let command = match read_request(&mut self.reader) {
            Ok(command) => command,
            Err(SnapError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!("Client {} disconnected before sending a request", self.peer_addr);
                return Ok(());
            }
            Err(SnapError::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                tracing::debug!("Read timeout for client {}", self.peer_addr);
                return Ok(());
            }
            Err(SnapError::Protocol(message)) => {
                tracing::debug!("Bad request from {}: {}", self.peer_addr, message);
                return self.send_response(Response::bad_request(&message));
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                return Err(e);
            }
        };

        tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

        let response = engine.execute(command);
        self.send_response(response)
    }

    /// Send a response, treating a vanished client as a normal close
    pub fn send_response(&mut self, response: Response) -> Result<()> {
        match write_response(&mut self.writer, &response) {
            Ok(()) => Ok(()),
            Err(SnapError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr,
                    e
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
