//! HTTP gateway: per-session document upload and question answering with
//! bearer auth, rate limiting and a health endpoint.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::GatewayServer;
