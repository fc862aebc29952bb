//! Loading and validation for the card catalog, pack configs and saved pity.

pub mod load;
pub mod persistence;

pub use load::*;
pub use persistence::*;
