pub mod errors;
pub mod memory;
pub mod traits;
