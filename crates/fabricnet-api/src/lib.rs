// fabricnet-api: Async Rust client for the fabric controller top-down REST API

pub mod attachments;
pub mod client;
pub mod error;
pub mod models;
pub mod networks;
pub mod transport;
pub mod wire;

pub use client::DcnmClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
