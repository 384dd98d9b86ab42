//! Test function implementations organized by category
//!
//! - `unimodal`: single-optimum functions
//! - `multimodal`: functions with many local minima
//! - `constrained`: objectives paired with vector-valued constraints `g(x) <= 0`

pub mod constrained;
pub mod multimodal;
pub mod unimodal;

// Re-export all functions for easy access
pub use constrained::*;
pub use multimodal::*;
pub use unimodal::*;
