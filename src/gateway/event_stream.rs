//! Gateway event stream
//!
//! Follows window changes for `--watch` sessions. A blocking thread polls
//! the X11 socket with mio and signals a tokio [`Notify`] when it becomes
//! readable. Events x11rb has already read off the socket (for instance
//! while a refresh was waiting for property replies) never make the socket
//! readable again, so every wait starts by draining that queue.

use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, Notify};
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::rust_connection::RustConnection;

use super::{EwmhGateway, GatewayEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const X11_TOKEN: mio::Token = mio::Token(0);

pub struct EventStream {
    conn: Arc<RustConnection>,
    readable: Arc<Notify>,
    /// Dropping this stops the poll thread
    _running: oneshot::Receiver<()>,
}

impl EventStream {
    /// Start watching the connection. Must be called inside a tokio runtime.
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let readable = Arc::new(Notify::new());
        let (stopped, running) = oneshot::channel::<()>();
        spawn_socket_poller(conn.stream().as_raw_fd(), readable.clone(), stopped)?;

        Ok(Self {
            conn,
            readable,
            _running: running,
        })
    }

    /// Next non-empty batch of gateway events.
    ///
    /// Returns at once when events are already queued inside x11rb,
    /// including ones queued before the stream was created.
    pub async fn next_batch(&self, gateway: &EwmhGateway) -> Result<Vec<GatewayEvent>> {
        wait_for_batch(&self.readable, || self.pending(gateway)).await
    }

    /// Translate every event x11rb has queued, without blocking
    fn pending(&self, gateway: &EwmhGateway) -> Result<Vec<GatewayEvent>> {
        let mut batch = Vec::new();
        while let Some(event) = self
            .conn
            .poll_for_event()
            .context("X11 connection failed while polling for events")?
        {
            batch.extend(gateway.translate(&event));
        }
        Ok(batch)
    }
}

/// Drain first, sleep only when nothing is queued.
async fn wait_for_batch<F>(readable: &Notify, mut take_pending: F) -> Result<Vec<GatewayEvent>>
where
    F: FnMut() -> Result<Vec<GatewayEvent>>,
{
    loop {
        let batch = take_pending()?;
        if !batch.is_empty() {
            return Ok(batch);
        }
        readable.notified().await;
    }
}

fn spawn_socket_poller(fd: RawFd, readable: Arc<Notify>, stopped: oneshot::Sender<()>) -> Result<()> {
    let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
    poll.registry()
        .register(&mut mio::unix::SourceFd(&fd), X11_TOKEN, mio::Interest::READABLE)
        .context("Failed to register the X11 socket with mio")?;

    tokio::task::spawn_blocking(move || {
        let mut events = mio::Events::with_capacity(4);
        while !stopped.is_closed() {
            match poll.poll(&mut events, Some(POLL_INTERVAL)) {
                Ok(()) if events.iter().any(|e| e.token() == X11_TOKEN) => readable.notify_one(),
                Ok(()) => {}
                Err(e) => warn!("Polling the X11 socket failed: {}", e),
            }
        }
        debug!("X11 socket poller stopped");
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::WindowHandle;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_queued_events_do_not_wait_for_socket() {
        let readable = Notify::new();
        let queue = RefCell::new(vec![vec![GatewayEvent::WindowListChanged]]);
        let take = || -> Result<Vec<GatewayEvent>> { Ok(queue.borrow_mut().pop().unwrap_or_default()) };

        let batch = tokio::time::timeout(Duration::from_secs(1), wait_for_batch(&readable, take))
            .await
            .expect("queued events were held back")
            .unwrap();
        assert_eq!(batch, vec![GatewayEvent::WindowListChanged]);
    }

    #[tokio::test]
    async fn test_empty_queue_waits_for_readable() {
        let readable = Notify::new();
        let queue: RefCell<Vec<Vec<GatewayEvent>>> = RefCell::new(Vec::new());
        let take = || -> Result<Vec<GatewayEvent>> { Ok(queue.borrow_mut().pop().unwrap_or_default()) };

        let producer = async {
            tokio::task::yield_now().await;
            queue
                .borrow_mut()
                .push(vec![GatewayEvent::TitleChanged(WindowHandle(7))]);
            readable.notify_one();
        };

        let (batch, ()) = tokio::join!(wait_for_batch(&readable, take), producer);
        assert_eq!(
            batch.unwrap(),
            vec![GatewayEvent::TitleChanged(WindowHandle(7))]
        );
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let readable = Notify::new();
        let take = || -> Result<Vec<GatewayEvent>> { anyhow::bail!("connection reset") };
        assert!(wait_for_batch(&readable, take).await.is_err());
    }
}
