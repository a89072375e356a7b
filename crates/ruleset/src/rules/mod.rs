//! Leaf rules attached by the specialized rule set builders.
//!
//! Each rule carries a conflict key, so re-attaching one through the same
//! builder keeps only the latest instance.

pub mod allowed;
pub mod bounds;
pub mod length;
pub mod pattern;

pub use allowed::{AllowedInts, AllowedStrings};
pub use bounds::{Max, Min};
pub use length::{MaxLength, MinLength};
pub use pattern::Matches;
