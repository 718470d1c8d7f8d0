//! Core types shared by every part of the engine
//!
//! - **Errors**: [`ConfigError`] for declaration and binding mistakes
//! - **Values**: attribute maps, flattening, and the truthiness/presence/equality
//!   rules validators rely on

pub mod error;
pub mod value;

pub use error::{ConfigError, Result};
pub use value::{
    Attributes, Snapshot, display, flatten, is_present, is_truthy, lookup, strict_eq,
};
