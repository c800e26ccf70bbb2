pub mod entity;
pub mod patterns;
pub mod remote;
pub mod merge;

pub use entity::*;
pub use patterns::*;
pub use remote::*;
pub use merge::*;
