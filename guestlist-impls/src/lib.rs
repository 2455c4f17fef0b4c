mod gates;
mod stores;

pub use gates::*;
pub use stores::*;
