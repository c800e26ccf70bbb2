pub mod config;
pub mod debounce;
pub mod conductor;

pub use config::*;
pub use debounce::*;
pub use conductor::*;
