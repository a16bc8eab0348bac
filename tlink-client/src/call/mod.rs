mod call_command;
mod call_controller;
mod call_error;
mod call_handle;

pub use call_command::CallCommand;
pub use call_controller::CallController;
pub use call_error::CallError;
pub use call_handle::CallHandle;
