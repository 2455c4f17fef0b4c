mod config;
mod gateway;
mod qr;
mod session;

pub use config::*;
pub use gateway::*;
pub use qr::*;
pub use session::*;
