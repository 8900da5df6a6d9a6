//! Networking abstraction layer for TCP connections.
//!
//! This module provides the abstraction from raw TCP sockets to connections
//! that send and receive [`Message`] objects, plus parallel handling of
//! incoming connections using a thread pool and the [`ServerHandler`]
//! abstraction. Nothing here is Chord-specific; the routing engine and
//! maintenance loops never see a [`Connection`] directly, only the
//! [`crate::peer_client::PeerClient`] trait that is built on top of it.
//!
//! [`Message`]: ../message/enum.Message.html
//! [`crate::peer_client::PeerClient`]: ../peer_client/trait.PeerClient.html

use crate::message::Message;
use std::io;
use std::io::prelude::*;
use std::net::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use threadpool::ThreadPool;

/// A connection between two peers used to send and receive [`Message`]
/// objects over TCP.
pub struct Connection {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl Connection {
    /// Opens a TCP connection to a remote peer, with `timeout_ms` applied to
    /// both read and write operations.
    pub fn open<A: ToSocketAddrs>(addr: A, timeout_ms: u64) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;

        let timeout = Duration::from_millis(timeout_ms);
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: TcpStream) -> Self {
        let buffer = Vec::with_capacity(Message::MAX_LENGTH);
        Self { stream, buffer }
    }

    /// Receives a single message from the remote peer. Blocks until a full
    /// message (or EOF) has been read.
    pub fn receive(&mut self) -> io::Result<Message> {
        self.buffer.clear();
        self.stream.read_to_end(&mut self.buffer)?;
        Message::parse(self.buffer.as_slice())
    }

    /// Sends a message to the remote peer, then shuts down the write half so
    /// the receiver's `read_to_end` completes.
    pub fn send(&mut self, msg: &Message) -> io::Result<()> {
        let mut out = Vec::with_capacity(Message::MAX_LENGTH);
        msg.write_bytes(&mut out)?;
        self.stream.write_all(out.as_slice())?;
        self.stream.shutdown(Shutdown::Write)
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }
}

/// A trait to handle incoming requests from a [`Server`].
pub trait ServerHandler {
    /// A connection has been established with some remote peer.
    fn handle_connection(&self, connection: Connection);

    /// The incoming request was unsuccessful before a [`Connection`] could
    /// be built.
    fn handle_error(&self, error: io::Error);

    /// Handles an incoming connection, dispatching to `handle_connection` or
    /// `handle_error` depending on `result`.
    fn handle_incoming(&self, result: io::Result<TcpStream>) {
        match result {
            Ok(stream) => self.handle_connection(Connection::from_stream(stream)),
            Err(error) => self.handle_error(error),
        }
    }
}

/// A multithreaded server accepting connections on a `TcpListener` and
/// dispatching each to a worker thread from a [`ThreadPool`].
pub struct Server {
    handler: Arc<dyn ServerHandler + Send + Sync>,
}

impl Server {
    pub fn new(handler: Arc<dyn ServerHandler + Send + Sync>) -> Self {
        Self { handler }
    }

    /// Listens on `addr`, accepting connections until the process exits.
    /// `num_workers` is the size of the thread pool handling incoming
    /// requests in parallel (per §4.6, no per-operation rate limiting is
    /// applied beyond this bound on concurrency).
    pub fn listen<A: ToSocketAddrs>(
        self,
        addr: A,
        num_workers: usize,
    ) -> io::Result<thread::JoinHandle<()>> {
        let listener = TcpListener::bind(addr)?;

        let handle = thread::spawn(move || {
            let pool = ThreadPool::new(num_workers);

            for result in listener.incoming() {
                let handler = Arc::clone(&self.handler);
                pool.execute(move || {
                    handler.handle_incoming(result);
                });
            }
        });

        Ok(handle)
    }
}
