//! TCP Server
//!
//! Accepts connections and hands each one to the engine.
//!
//! - `serve_concurrent`: one worker thread per connection, all sharing the
//!   engine through an `Arc`. Requires a `Sync` storage.
//! - `serve_sequential`: connections are handled one by one on the accepting
//!   thread. Used with the in-memory storage.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam::sync::WaitGroup;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, SnapError};
use crate::protocol::Response;
use crate::storage::Storage;

use super::Connection;

/// TCP server for SnapKV
pub struct Server {
    config: Config,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and return once in-flight
    /// requests finish
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // Wake the blocking accept() so it sees the flag
        let _ = TcpStream::connect(self.addr);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            SnapError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr,
        }
    }

    /// Serve connections one at a time on the calling thread
    pub fn serve_sequential<S: Storage>(&self, engine: &Engine<S>) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if let Err(e) = self.handle_stream(stream, engine) {
                tracing::debug!("Connection ended with error: {}", e);
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Serve each connection on its own worker thread
    ///
    /// Connections beyond `max_connections` get a 503. Returns after
    /// shutdown once every worker has finished.
    pub fn serve_concurrent<S>(&self, engine: Arc<Engine<S>>) -> Result<()>
    where
        S: Storage + Send + Sync + 'static,
    {
        let in_flight = WaitGroup::new();

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if self.active.fetch_add(1, Ordering::SeqCst) >= self.config.max_connections {
                self.active.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!(
                    "Connection limit ({}) reached, rejecting client",
                    self.config.max_connections
                );
                if let Ok(mut conn) = Connection::new(stream) {
                    let _ = conn.send_response(Response::unavailable());
                }
                continue;
            }

            let engine = Arc::clone(&engine);
            let active = Arc::clone(&self.active);
            let done = in_flight.clone();
            let read_ms = self.config.read_timeout_ms;
            let write_ms = self.config.write_timeout_ms;

            let spawned = thread::Builder::new()
                .name("snapkv-conn".to_string())
                .spawn(move || {
                    if let Err(e) = serve_one(stream, &*engine, read_ms, write_ms) {
                        tracing::debug!("Connection ended with error: {}", e);
                    }
                    active.fetch_sub(1, Ordering::SeqCst);
                    drop(done);
                });

            if let Err(e) = spawned {
                self.active.fetch_sub(1, Ordering::SeqCst);
                tracing::error!("Failed to spawn connection worker: {}", e);
            }
        }

        in_flight.wait();
        tracing::info!("Server stopped");
        Ok(())
    }

    fn handle_stream<S: Storage>(&self, stream: TcpStream, engine: &Engine<S>) -> Result<()> {
        serve_one(
            stream,
            engine,
            self.config.read_timeout_ms,
            self.config.write_timeout_ms,
        )
    }
}

fn serve_one<S: Storage>(
    stream: TcpStream,
    engine: &Engine<S>,
    read_ms: u64,
    write_ms: u64,
) -> Result<()> {
    let mut conn = Connection::new(stream)?;
    conn.set_timeouts(read_ms, write_ms)?;
    conn.handle(engine)
}
