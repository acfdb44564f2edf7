//! # Utilities Module
//!
//! Grid navigation helpers shared by click-to-move and autopilot.

pub mod navigation;

pub use navigation::*;
