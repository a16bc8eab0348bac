pub mod config;
pub mod http;
pub mod registry;
pub mod room;
pub mod signaling;

pub use config::ServerConfig;
pub use http::router;
pub use registry::*;
pub use room::*;
pub use signaling::*;
