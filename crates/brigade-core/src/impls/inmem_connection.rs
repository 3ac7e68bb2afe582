//! InMemoryConnection - development/test transport.
//!
//! A duplex channel pair built on tokio mpsc. Each end implements
//! `Connection`; what one end sends, the other receives. Dropping an end
//! turns the peer's operations into `ChannelClosed` instead of a hang.

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::error::DispatchError;
use crate::ports::{Connection, Payload};

pub struct InMemoryConnection {
    tx: mpsc::Sender<Payload>,
    // mpsc::Receiver needs &mut; the trait takes &self, so wrap it.
    rx: Mutex<mpsc::Receiver<Payload>>,
}

impl InMemoryConnection {
    /// Create a connected pair of ends.
    ///
    /// `buffer` bounds each direction independently; sends past the bound
    /// suspend until the peer drains, matching the "suspend until accepted
    /// by the transport" contract.
    pub fn pair(buffer: usize) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel(buffer);
        let (b_tx, a_rx) = mpsc::channel(buffer);
        (
            Self {
                tx: a_tx,
                rx: Mutex::new(a_rx),
            },
            Self {
                tx: b_tx,
                rx: Mutex::new(b_rx),
            },
        )
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn receive(&self) -> Result<Payload, DispatchError> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(DispatchError::ChannelClosed)
    }

    async fn send(&self, payload: Payload) -> Result<(), DispatchError> {
        self.tx
            .send(payload)
            .await
            .map_err(|_| DispatchError::ChannelClosed)
    }
}
