//! Core types for Quintet.

pub mod agent;
pub mod generation;
pub mod message;
pub mod usage;

pub use agent::*;
pub use generation::*;
pub use message::*;
pub use usage::*;
