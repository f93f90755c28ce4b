mod core;
mod endpoint;

pub use core::transfer;
pub use endpoint::transfer_endpoint;
