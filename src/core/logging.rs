//! Per-interface debug gating in front of `tracing`
//!
//! Every interface carries an [`InterfaceLogger`] holding a category bitmask.
//! [`log_80211!`](crate::log_80211) checks the mask before any formatting is
//! done, so a cleared category costs one atomic load.

use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

/// Debug category bitmask
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DebugFlags(u32);

impl DebugFlags {
    pub const NONE: DebugFlags = DebugFlags(0);
    pub const ERROR: DebugFlags = DebugFlags(1 << 0);
    pub const ATTACH: DebugFlags = DebugFlags(1 << 1);
    pub const RX: DebugFlags = DebugFlags(1 << 2);
    pub const TX: DebugFlags = DebugFlags(1 << 3);
    pub const MONITOR: DebugFlags = DebugFlags(1 << 4);
    pub const IOCTL: DebugFlags = DebugFlags(1 << 5);
    pub const POWER: DebugFlags = DebugFlags(1 << 6);
    pub const ALL: DebugFlags = DebugFlags(0x7f);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when any bit of `other` is set in `self`
    pub const fn intersects(self, other: DebugFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for DebugFlags {
    type Output = DebugFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        DebugFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for DebugFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DebugFlags({:#x})", self.0)
    }
}

impl FromStr for DebugFlags {
    type Err = String;

    /// Accepts `all`, a number (`0x` prefix for hex) or a `,`-separated
    /// list of category names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(DebugFlags::ALL);
        }
        if let Some(hex_bits) = s.strip_prefix("0x") {
            return u32::from_str_radix(hex_bits, 16)
                .map(DebugFlags)
                .map_err(|e| e.to_string());
        }
        if let Ok(bits) = s.parse::<u32>() {
            return Ok(DebugFlags(bits));
        }

        let mut flags = DebugFlags::NONE;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            flags |= match name {
                "error" => DebugFlags::ERROR,
                "attach" => DebugFlags::ATTACH,
                "rx" => DebugFlags::RX,
                "tx" => DebugFlags::TX,
                "monitor" => DebugFlags::MONITOR,
                "ioctl" => DebugFlags::IOCTL,
                "power" => DebugFlags::POWER,
                other => return Err(format!("unknown category {other:?}")),
            };
        }
        Ok(flags)
    }
}

/// Logger capability owned by one interface
#[derive(Debug)]
pub struct InterfaceLogger {
    name: String,
    flags: AtomicU32,
}

impl InterfaceLogger {
    pub fn new(name: impl Into<String>, flags: DebugFlags) -> Self {
        Self {
            name: name.into(),
            flags: AtomicU32::new(flags.bits()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> DebugFlags {
        DebugFlags(self.flags.load(Ordering::Relaxed))
    }

    pub fn set_flags(&self, flags: DebugFlags) {
        self.flags.store(flags.bits(), Ordering::Relaxed);
    }

    pub fn enabled(&self, category: DebugFlags) -> bool {
        self.flags().intersects(category)
    }
}

/// Anything that may or may not carry an interface logger
pub trait DebugGate {
    fn logger(&self) -> Option<&InterfaceLogger>;
}

impl DebugGate for InterfaceLogger {
    fn logger(&self) -> Option<&InterfaceLogger> {
        Some(self)
    }
}

impl<T: DebugGate + ?Sized> DebugGate for &T {
    fn logger(&self) -> Option<&InterfaceLogger> {
        (**self).logger()
    }
}

impl<T: DebugGate + ?Sized> DebugGate for Arc<T> {
    fn logger(&self) -> Option<&InterfaceLogger> {
        (**self).logger()
    }
}

impl<T: DebugGate> DebugGate for Option<T> {
    fn logger(&self) -> Option<&InterfaceLogger> {
        self.as_ref().and_then(DebugGate::logger)
    }
}

/// Emit a `tracing` debug event only when the interface has `category` enabled
///
/// The target may be an interface, a reference or `Arc` to one, or an
/// `Option` of those; `None` suppresses output.
#[macro_export]
macro_rules! log_80211 {
    ($target:expr, $category:expr, $($arg:tt)+) => {{
        if let Some(logger) = $crate::core::logging::DebugGate::logger(&$target) {
            if logger.enabled($category) {
                ::tracing::debug!(interface = %logger.name(), $($arg)+);
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::Level;
    use tracing_subscriber::util::SubscriberInitExt;

    use super::*;

    #[test]
    fn test_flags_parse() {
        assert_eq!("all".parse::<DebugFlags>().unwrap(), DebugFlags::ALL);
        assert_eq!("0x21".parse::<DebugFlags>().unwrap().bits(), 0x21);
        assert_eq!("3".parse::<DebugFlags>().unwrap().bits(), 3);
        assert_eq!(
            "tx, rx".parse::<DebugFlags>().unwrap(),
            DebugFlags::TX | DebugFlags::RX
        );
        assert!("tx,radio".parse::<DebugFlags>().is_err());
    }

    #[test]
    fn test_logger_gate() {
        let logger = InterfaceLogger::new("wlan0", DebugFlags::ERROR);
        assert!(logger.enabled(DebugFlags::ERROR));
        assert!(!logger.enabled(DebugFlags::TX));

        logger.set_flags(DebugFlags::TX | DebugFlags::IOCTL);
        assert!(logger.enabled(DebugFlags::TX));
        assert!(!logger.enabled(DebugFlags::ERROR));
    }

    #[test]
    fn test_macro_formats_only_when_enabled() {
        struct Counted<'a>(&'a AtomicUsize);
        impl fmt::Display for Counted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fetch_add(1, Ordering::SeqCst);
                f.write_str("counted")
            }
        }

        let _guard = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::sink)
            .finish()
            .set_default();
        let formatted = AtomicUsize::new(0);

        let logger = InterfaceLogger::new("wlan0", DebugFlags::NONE);
        log_80211!(&logger, DebugFlags::TX, "{}", Counted(&formatted));
        let missing: Option<&InterfaceLogger> = None;
        log_80211!(missing, DebugFlags::ALL, "{}", Counted(&formatted));
        assert_eq!(formatted.load(Ordering::SeqCst), 0);

        logger.set_flags(DebugFlags::TX);
        log_80211!(&logger, DebugFlags::TX, "{}", Counted(&formatted));
        assert_eq!(formatted.load(Ordering::SeqCst), 1);
    }
}
