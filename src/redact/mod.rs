pub mod state;
pub mod rewrite;

pub use state::*;
pub use rewrite::*;
