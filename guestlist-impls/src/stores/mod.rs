mod file_prefs_cache;
mod file_session_store;
mod memory;

pub use file_prefs_cache::*;
pub use file_session_store::*;
pub use memory::*;
