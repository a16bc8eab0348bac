mod authorizer;
mod relay;
mod relay_error;
mod ws_handler;

pub use authorizer::*;
pub use relay::*;
pub use relay_error::*;
pub use ws_handler::*;
