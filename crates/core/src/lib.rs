//! Pack generation engine. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod content;
pub mod error;
pub mod holo;
pub mod pack;
pub mod pity;
pub mod rng;
pub mod select;
pub mod stats;

pub use cards::*;
pub use config::*;
pub use content::*;
pub use error::*;
pub use holo::*;
pub use pack::*;
pub use pity::*;
pub use rng::*;
pub use select::*;
pub use stats::*;
