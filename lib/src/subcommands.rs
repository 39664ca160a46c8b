pub use compute::*;
pub use explore::*;
pub use server::*;

pub mod compute;
pub mod explore;
pub mod server;
