//! Backend registry and transport.
//!
//! - [`registry`]: the fixed table of GA4GH backends, their capabilities and
//!   HTTP clients, built once at startup
//! - [`transport`]: sends one JSON request to a backend and classifies the
//!   response
//!
//! Both are read-only after startup and shared between concurrent requests.

pub mod registry;
pub mod transport;

pub use registry::{ClientSettings, Provider, ProviderConfig, Registry, RegistryError};
pub use transport::{HttpTransport, ParsedResponse, Transport, UpstreamRequest};
