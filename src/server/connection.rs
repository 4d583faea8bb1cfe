// Connection handling module
// Runs one accepted connection from accept to close: read, resolve, respond

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::Config;
use crate::handler::resolver;
use crate::http::{IncomingRequest, ResolvedResponse};
use crate::logger::{self, AccessLogEntry};
use crate::store::AssetStore;

/// The first read is treated as the whole request
pub const READ_BUFFER_SIZE: usize = 8192;

/// Where a connection is in its single request/response exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Reading,
    Resolving,
    Writing,
    Closed,
    Errored,
}

impl ConnectionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Resolving => "resolving",
            Self::Writing => "writing",
            Self::Closed => "closed",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Socket-level failure on one connection
#[derive(Debug)]
pub enum TransportError {
    Io(io::Error),
    WriteTimeout(Duration),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::WriteTimeout(d) => write!(f, "write timed out after {}ms", d.as_millis()),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Per-connection settings, shared by every handler of one server
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub access_log: bool,
    pub access_log_format: String,
}

impl ConnectionOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            read_timeout: cfg.server.read_timeout(),
            write_timeout: cfg.server.write_timeout(),
            access_log: cfg.logging.access_log,
            access_log_format: cfg.logging.access_log_format.clone(),
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            access_log: true,
            access_log_format: "common".to_string(),
        }
    }
}

/// How a connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A response was written and the write side shut down
    Answered {
        request_line: String,
        path: String,
        status: u16,
        body_bytes: usize,
    },
    /// No data before the inactivity timeout; nothing was written
    TimedOut,
    /// Peer closed before sending anything; nothing was written
    PeerClosed,
    /// Socket failure in the given state
    Errored { during: ConnectionState },
}

/// Serve exactly one request on `stream`, then close it.
///
/// Never fails: transport errors are logged and reported through the
/// returned outcome. The stream is dropped before returning.
pub async fn handle_connection<S>(
    mut stream: S,
    peer_addr: SocketAddr,
    store: &AssetStore,
    options: &ConnectionOptions,
) -> ConnectionOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();
    let mut state = ConnectionState::Idle;

    let outcome = match exchange(&mut stream, store, options, &mut state).await {
        Ok(outcome) => outcome,
        Err(err) => {
            logger::log_transport_error(&peer_addr, state.as_str(), &err);
            let during = state;
            state = ConnectionState::Errored;
            ConnectionOutcome::Errored { during }
        }
    };

    match &outcome {
        ConnectionOutcome::TimedOut => {
            logger::log_connection_timeout(&peer_addr, options.read_timeout.as_secs_f64());
        }
        ConnectionOutcome::PeerClosed => {
            logger::log_debug(&format!("[Connection] {peer_addr} closed without a request"));
        }
        ConnectionOutcome::Answered {
            request_line,
            path,
            status,
            body_bytes,
        } if options.access_log => {
            let mut entry =
                AccessLogEntry::new(peer_addr.to_string(), request_line.clone(), path.clone());
            entry.status = *status;
            entry.body_bytes = *body_bytes;
            entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            logger::log_access(&entry, &options.access_log_format);
        }
        _ => {}
    }

    drop(stream);
    logger::log_debug(&format!(
        "[Connection] {peer_addr} {} -> {}",
        state,
        ConnectionState::Closed
    ));
    outcome
}

/// Read, resolve, and write, advancing `state` before each step
async fn exchange<S>(
    stream: &mut S,
    store: &AssetStore,
    options: &ConnectionOptions,
    state: &mut ConnectionState,
) -> Result<ConnectionOutcome, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    *state = ConnectionState::Reading;
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let Ok(read) = timeout(options.read_timeout, stream.read(&mut buf)).await else {
        return Ok(ConnectionOutcome::TimedOut);
    };
    let n = read?;
    if n == 0 {
        return Ok(ConnectionOutcome::PeerClosed);
    }
    buf.truncate(n);

    *state = ConnectionState::Resolving;
    let request = IncomingRequest::parse(buf);
    let response = ResolvedResponse::from(resolver::resolve(request.path(), store).await);

    *state = ConnectionState::Writing;
    let bytes = response.to_bytes();
    timeout(options.write_timeout, async {
        stream.write_all(&bytes).await?;
        stream.flush().await?;
        // FIN, so the client sees end-of-body
        stream.shutdown().await
    })
    .await
    .map_err(|_| TransportError::WriteTimeout(options.write_timeout))??;

    Ok(ConnectionOutcome::Answered {
        request_line: request.request_line(),
        path: request.path().to_string(),
        status: response.status.code(),
        body_bytes: response.body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn quiet_options(read_timeout: Duration) -> ConnectionOptions {
        ConnectionOptions {
            read_timeout,
            access_log: false,
            ..ConnectionOptions::default()
        }
    }

    fn store_with_index() -> (tempfile::TempDir, AssetStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        let store = AssetStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_answers_single_request() {
        let (_dir, store) = store_with_index();
        let (mut client, server) = duplex(4096);
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let outcome =
            handle_connection(server, peer(), &store, &quiet_options(Duration::from_secs(1))).await;
        assert_eq!(
            outcome,
            ConnectionOutcome::Answered {
                request_line: "GET / HTTP/1.1".to_string(),
                path: "/".to_string(),
                status: 200,
                body_bytes: 11,
            }
        );

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        let text = String::from_utf8(response).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\n<h1>hi</h1>"));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out_without_response() {
        let (_dir, store) = store_with_index();
        let (mut client, server) = duplex(4096);

        let outcome = handle_connection(
            server,
            peer(),
            &store,
            &quiet_options(Duration::from_millis(50)),
        )
        .await;
        assert_eq!(outcome, ConnectionOutcome::TimedOut);

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_peer_close_before_request() {
        let (_dir, store) = store_with_index();
        let (client, server) = duplex(4096);
        drop(client);

        let outcome =
            handle_connection(server, peer(), &store, &quiet_options(Duration::from_secs(1))).await;
        assert_eq!(outcome, ConnectionOutcome::PeerClosed);
    }

    #[tokio::test]
    async fn test_write_to_vanished_peer_is_contained() {
        let (_dir, store) = store_with_index();
        let (mut client, server) = duplex(4096);
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        drop(client);

        let outcome =
            handle_connection(server, peer(), &store, &quiet_options(Duration::from_secs(1))).await;
        assert_eq!(
            outcome,
            ConnectionOutcome::Errored {
                during: ConnectionState::Writing
            }
        );
    }
}
