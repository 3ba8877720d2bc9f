//! Passive packet taps (BPF-style)

use tokio::sync::broadcast;

use crate::core::types::{Dlt, Packet};

/// Per-tap backlog; slow listeners lose the oldest packets
pub const TAP_BACKLOG: usize = 256;

/// Direction of a tapped packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapDirection {
    In,
    Out,
}

/// Packet as seen by a tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TappedPacket {
    pub dlt: Dlt,
    pub direction: TapDirection,
    /// Header prepended to the packet (radiotap, prism, ...)
    pub header: Option<Vec<u8>>,
    pub packet: Packet,
}

impl TappedPacket {
    /// Header and payload as one contiguous frame
    pub fn frame(&self) -> Vec<u8> {
        let header = self.header.as_deref().unwrap_or_default();
        let mut frame = Vec::with_capacity(header.len() + self.packet.len());
        frame.extend_from_slice(header);
        frame.extend_from_slice(self.packet.as_bytes());
        frame
    }
}

/// Tap point attached to one interface
#[derive(Debug, Clone)]
pub struct BpfTap {
    tx: broadcast::Sender<TappedPacket>,
}

impl BpfTap {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(TAP_BACKLOG);
        Self { tx }
    }

    /// Attach a listener
    pub fn subscribe(&self) -> broadcast::Receiver<TappedPacket> {
        self.tx.subscribe()
    }

    pub fn has_listeners(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    /// Deliver a received packet with an optional prepended header
    pub fn input(&self, dlt: Dlt, header: Option<&[u8]>, packet: Packet) {
        if !self.has_listeners() {
            return;
        }
        self.deliver(TappedPacket {
            dlt,
            direction: TapDirection::In,
            header: header.map(<[u8]>::to_vec),
            packet,
        });
    }

    /// Mirror an outbound packet
    pub fn output(&self, dlt: Dlt, packet: Packet) {
        if !self.has_listeners() {
            return;
        }
        self.deliver(TappedPacket {
            dlt,
            direction: TapDirection::Out,
            header: None,
            packet,
        });
    }

    fn deliver(&self, tapped: TappedPacket) {
        // No listener is not an error
        let _ = self.tx.send(tapped);
    }
}

impl Default for BpfTap {
    fn default() -> Self {
        Self::new()
    }
}
