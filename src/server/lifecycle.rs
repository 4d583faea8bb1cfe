// Server lifecycle module
// Owns the listening socket, dispatches connections, and handles shutdown

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::connection::{handle_connection, ConnectionOptions};
use super::listener::create_listener;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logger;
use crate::store::AssetStore;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything needed to start a server
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub connection: ConnectionOptions,
    pub shutdown_grace: Duration,
}

impl ServerSettings {
    /// Settings for `addr` with default timeouts
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connection: ConnectionOptions::default(),
            shutdown_grace: Duration::from_secs(1),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            addr: cfg.socket_addr()?,
            connection: ConnectionOptions::from_config(cfg),
            shutdown_grace: cfg.server.shutdown_grace(),
        })
    }
}

/// Observable lifecycle of a started server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// Listening; `url` is reachable
    Ready { url: String },
    /// Listener released
    Stopped,
}

/// Handle to a running server, owned by the embedding caller.
///
/// Dropping the handle does not stop the server; call [`ServerHandle::shutdown`].
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    url: String,
    shutdown: Arc<Notify>,
    status: watch::Receiver<ServerStatus>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://host:port` of the bound listener
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> watch::Receiver<ServerStatus> {
        self.status.clone()
    }

    /// Stop accepting, release the listener, and wait up to the grace
    /// period for in-flight connections.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            logger::log_error(&format!("Accept loop ended abnormally: {e}"));
        }
    }
}

/// Bind the listener and start accepting connections.
///
/// Returns only after bind and listen succeed, so the returned URL is
/// immediately reachable. Must be called from within a tokio runtime.
pub fn start(settings: ServerSettings, store: AssetStore) -> Result<ServerHandle> {
    if let Some(warning) = exposure_warning(&settings.addr) {
        logger::log_warning(&warning);
    }
    let listener = create_listener(settings.addr).map_err(|source| {
        logger::log_bind_failed(&settings.addr, &source);
        Error::Bind {
            addr: settings.addr,
            source,
        }
    })?;
    let local_addr = listener.local_addr().map_err(|source| Error::Bind {
        addr: settings.addr,
        source,
    })?;

    let url = format!("http://{local_addr}");
    let (status_tx, status_rx) = watch::channel(ServerStatus::Ready { url: url.clone() });
    let shutdown = Arc::new(Notify::new());

    let task = tokio::spawn(accept_loop(
        listener,
        local_addr,
        store,
        Arc::new(settings.connection),
        settings.shutdown_grace,
        Arc::clone(&shutdown),
        status_tx,
    ));

    Ok(ServerHandle {
        local_addr,
        url,
        shutdown,
        status: status_rx,
        task,
    })
}

/// Warning for listeners reachable from outside the host
fn exposure_warning(addr: &SocketAddr) -> Option<String> {
    (!addr.ip().is_loopback()).then(|| {
        format!(
            "{} is not a loopback address; assets will be reachable from the network",
            addr.ip()
        )
    })
}

/// Decrements the in-flight counter when a connection task ends
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn accept_loop(
    listener: TcpListener,
    local_addr: SocketAddr,
    store: AssetStore,
    options: Arc<ConnectionOptions>,
    grace: Duration,
    shutdown: Arc<Notify>,
    status: watch::Sender<ServerStatus>,
) {
    let in_flight = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        logger::log_connection_accepted(&peer_addr);
                        let guard = InFlight::enter(&in_flight);
                        let store = store.clone();
                        let options = Arc::clone(&options);
                        tokio::spawn(async move {
                            let _guard = guard;
                            handle_connection(stream, peer_addr, &store, &options).await;
                        });
                    }
                    Err(e) => logger::log_accept_failed(&e),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    let remaining = drain(&in_flight, grace).await;
    logger::log_shutdown(&local_addr, remaining);
    status.send_replace(ServerStatus::Stopped);
}

/// Wait until no connection is in flight or `grace` elapses; returns the
/// number still running.
async fn drain(in_flight: &AtomicUsize, grace: Duration) -> usize {
    let deadline = Instant::now() + grace;
    loop {
        let remaining = in_flight.load(Ordering::SeqCst);
        if remaining == 0 || Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
