pub mod ws_client;

pub use signal_helpers::*;
pub use test_connection::*;
pub use ws_client::*;
