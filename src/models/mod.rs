pub mod psychology;
pub mod trade;

pub use psychology::*;
pub use trade::*;
