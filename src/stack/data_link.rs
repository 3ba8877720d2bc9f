//! Data link input path of one interface

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::warn;

use crate::core::types::Packet;

/// Packets buffered between the driver and the data link layer
pub const INPUT_QUEUE_DEPTH: usize = 512;

/// Producer side, held by the interface
#[derive(Debug)]
pub struct DataLink {
    tx: mpsc::Sender<Packet>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Consumer side, claimed by the data link layer
#[derive(Debug)]
pub struct DataLinkReceiver {
    rx: mpsc::Receiver<Packet>,
}

/// Create a connected data link pair
pub fn data_link() -> (DataLink, DataLinkReceiver) {
    let (tx, rx) = mpsc::channel(INPUT_QUEUE_DEPTH);
    (
        DataLink {
            tx,
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        },
        DataLinkReceiver { rx },
    )
}

impl DataLink {
    /// Hand a packet to the data link layer
    ///
    /// Never blocks. Packets are dropped when the input queue is full or
    /// nobody listens anymore; delivery order is submission order.
    pub fn input(&self, packet: Packet) -> bool {
        match self.tx.try_send(packet) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("data link input queue full, dropping packet");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl DataLinkReceiver {
    /// Wait for the next received packet
    pub async fn recv(&mut self) -> Option<Packet> {
        self.rx.recv().await
    }

    /// Take the next packet if one is queued
    pub fn try_recv(&mut self) -> Option<Packet> {
        self.rx.try_recv().ok()
    }
}
