//! Configuration types
//!
//! Board display descriptions: what panel sits on which bus, how it is
//! powered and lit, and how its frames are buffered. With the `toml`
//! feature a description can be loaded from a TOML document.

pub mod display;
pub mod types;

pub use display::*;
pub use types::*;
