//! Output queue feeding the controller's transmit path

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::core::types::Packet;

/// Default number of packets the stack may queue for transmission
pub const OUTPUT_QUEUE_CAPACITY: usize = 256;

/// Stack side of the output queue
#[derive(Debug)]
pub struct OutputQueue {
    tx: mpsc::Sender<Packet>,
    capacity: usize,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

/// Controller side; drained by the transmit task
#[derive(Debug)]
pub struct OutputQueueDrain {
    rx: mpsc::Receiver<Packet>,
}

impl OutputQueue {
    pub fn new(capacity: usize) -> (Self, OutputQueueDrain) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                capacity,
                enqueued: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            },
            OutputQueueDrain { rx },
        )
    }

    /// Queue a packet for transmission, handing it back if the queue is full
    pub fn enqueue(&self, packet: Packet) -> Result<(), Packet> {
        match self.tx.try_send(packet) {
            Ok(()) => {
                self.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(packet))
            | Err(mpsc::error::TrySendError::Closed(packet)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(packet)
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Packets currently waiting
    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl OutputQueueDrain {
    pub async fn next(&mut self) -> Option<Packet> {
        self.rx.recv().await
    }
}
