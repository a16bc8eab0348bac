pub mod call;
pub mod config;
pub mod media;
pub mod negotiation;
pub mod relay_client;
pub mod transport;

pub use call::*;
pub use config::ClientConfig;
pub use media::*;
pub use negotiation::*;
pub use relay_client::{RelayClient, StartError};
pub use transport::*;
