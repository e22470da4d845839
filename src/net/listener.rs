//! TCP listener implementation with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce max_connections limit via semaphore
//! - Tell transient accept errors apart from fatal ones

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] io::Error),
    /// The connection limit semaphore was closed.
    #[error("Connection limit closed")]
    LimitClosed,
}

impl ListenerError {
    /// Whether this error concerns a single connection rather than the listener.
    ///
    /// The peer can reset or abort between the kernel queueing the connection
    /// and our accept; those must not bring the listener down.
    pub fn is_connection_error(&self) -> bool {
        match self {
            ListenerError::Accept(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

/// A source of accepted connections for the HTTP server.
///
/// [`Listener`] is the production implementation.
pub trait Accept: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Wait for the next connection. Must be cancel safe.
    fn accept(
        &self,
    ) -> impl Future<Output = Result<(Self::Stream, SocketAddr, ConnectionPermit), ListenerError>> + Send;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// A bounded TCP listener that limits concurrent connections.
///
/// Uses a semaphore to enforce `max_connections`. When the limit is reached,
/// new connections will wait until a slot becomes available.
#[derive(Debug)]
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Semaphore to limit concurrent connections.
    connection_limit: Arc<Semaphore>,
    /// Configured maximum connections.
    max_connections: usize,
}

impl Listener {
    /// Bind to `address` with connection limits.
    pub async fn bind(address: &str, max_connections: usize) -> Result<Self, ListenerError> {
        let bind_error = |source| ListenerError::Bind {
            address: address.to_string(),
            source,
        };

        let addr: SocketAddr = address
            .parse()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        Self::from_tcp(listener, max_connections).map_err(bind_error)
    }

    /// Wrap an already bound listener.
    pub fn from_tcp(listener: TcpListener, max_connections: usize) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;

        tracing::info!(
            address = %local_addr,
            max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// This will wait if the connection limit has been reached.
    /// Returns the stream and a permit that must be held for the connection's lifetime.
    /// Cancel safe.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        // Acquire permit first (backpressure)
        let permit = Arc::clone(&self.connection_limit)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::LimitClosed)?;

        // Then accept the connection
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Get current available connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    /// Get configured maximum connections.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

impl Accept for Listener {
    type Stream = TcpStream;

    fn accept(
        &self,
    ) -> impl Future<Output = Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError>> + Send
    {
        Listener::accept(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Listener::local_addr(self)
    }
}

/// A permit representing a connection slot.
///
/// When dropped, the connection slot is released back to the pool,
/// including when the connection task is aborted.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_rejects_unparseable_address() {
        let err = Listener::bind("not-an-address", 4).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
        assert!(!err.is_connection_error());
    }

    #[tokio::test]
    async fn bind_fails_when_port_taken() {
        let first = Listener::bind("127.0.0.1:0", 4).await.unwrap();
        let taken = first.local_addr().unwrap().to_string();

        let err = Listener::bind(&taken, 4).await.unwrap_err();
        assert!(err.to_string().contains(&taken));
    }

    #[tokio::test]
    async fn permits_return_on_drop() {
        let listener = Listener::bind("127.0.0.1:0", 2).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = TcpStream::connect(addr).await.unwrap();

        let (_stream, _peer, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.available_permits(), 1);

        drop(permit);
        assert_eq!(listener.available_permits(), listener.max_connections());
    }

    #[test]
    fn resets_are_connection_errors() {
        let err = ListenerError::Accept(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(err.is_connection_error());

        let err = ListenerError::Accept(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_connection_error());
    }
}
