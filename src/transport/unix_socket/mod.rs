//! Unix domain socket control transport (JSON-RPC 2.0, one message per line)

pub mod handler;
pub mod server;
pub mod session;

pub use {
    handler::RequestHandler,
    server::UnixSocketServer,
    session::{SessionReader, UnixSocketSession},
};
