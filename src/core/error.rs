//! Error types for the 802.11 controller

use thiserror::Error;

use super::types::MacAddress;

/// Result type for driver hooks and configuration requests
pub type DriverResult<T> = Result<T, DriverError>;

/// Result type for controller lifecycle operations
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Status codes handed back to the network stack (Darwin `errno` values)
pub mod errno {
    pub const SUCCESS: i32 = 0;
    pub const EIO: i32 = 5;
    pub const ENXIO: i32 = 6;
    pub const ENOMEM: i32 = 12;
    pub const EBUSY: i32 = 16;
    pub const EINVAL: i32 = 22;
    pub const EOPNOTSUPP: i32 = 102;
}

/// Failure reported by a driver hook or a configuration request
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error("operation not supported by this driver")]
    NotSupported,

    #[error("invalid argument")]
    InvalidArgument,

    #[error("hardware busy")]
    Busy,

    #[error("no such device")]
    NoDevice,

    #[error("out of memory")]
    NoMemory,

    #[error("hardware I/O error")]
    Io,

    #[error("driver error (errno {0})")]
    Other(i32),
}

impl DriverError {
    /// Non-zero status code for this failure
    pub fn errno(&self) -> i32 {
        match self {
            DriverError::NotSupported => errno::EOPNOTSUPP,
            DriverError::InvalidArgument => errno::EINVAL,
            DriverError::Busy => errno::EBUSY,
            DriverError::NoDevice => errno::ENXIO,
            DriverError::NoMemory => errno::ENOMEM,
            DriverError::Io => errno::EIO,
            DriverError::Other(code) => *code,
        }
    }
}

/// Collapse a driver result into the status code seen by the stack
pub fn status_code(result: &DriverResult<()>) -> i32 {
    match result {
        Ok(()) => errno::SUCCESS,
        Err(e) => e.errno(),
    }
}

/// Errors related to controller lifecycle and attachment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("work loop unavailable: no async runtime to host it")]
    WorkLoopUnavailable,

    #[error("primary interface already attached")]
    AlreadyAttached,

    #[error("primary interface not attached")]
    PrimaryNotAttached,

    #[error("interface {0} is not attached")]
    NotAttached(String),

    #[error("hardware address {0} already in use")]
    AddressInUse(MacAddress),

    #[error("interface name {0:?} does not fit IFNAMSIZ")]
    InvalidInterfaceName(String),

    #[error("invalid hardware address {0}")]
    InvalidHardwareAddress(MacAddress),

    #[error("driver rejected virtual interface: {0}")]
    EnableRejected(DriverError),

    #[error("transmit path suspended")]
    TxSuspended,

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
}

impl ControllerError {
    /// Status code for the stack boundary
    pub fn errno(&self) -> i32 {
        match self {
            ControllerError::WorkLoopUnavailable => errno::ENOMEM,
            ControllerError::AlreadyAttached | ControllerError::TxSuspended => errno::EBUSY,
            ControllerError::PrimaryNotAttached | ControllerError::NotAttached(_) => errno::ENXIO,
            ControllerError::AddressInUse(_)
            | ControllerError::InvalidHardwareAddress(_)
            | ControllerError::InvalidInterfaceName(_) => errno::EINVAL,
            ControllerError::EnableRejected(e) | ControllerError::Driver(e) => e.errno(),
        }
    }
}

/// Errors related to configuration parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid hardware address: {0}")]
    InvalidAddress(String),

    #[error("invalid virtual interface {0:?}: expected ROLE@ADDRESS")]
    InvalidVirtualInterface(String),

    #[error("unknown virtual interface role: {0}")]
    UnknownRole(String),

    #[error("invalid debug flags: {0}")]
    InvalidDebugFlags(String),
}

/// Errors related to the control socket transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid message format: not UTF-8")]
    InvalidMessageFormat,

    #[error("Message exceeds {0} bytes")]
    MessageTooLong(usize),
}
