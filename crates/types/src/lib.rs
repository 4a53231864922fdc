//! Value types shared across the name registry client crates.

pub mod address;
pub mod hash;
pub mod name;

pub use address::*;
pub use hash::*;
pub use name::*;
