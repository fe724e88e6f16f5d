//! Split Optimizer
//!
//! Picks contiguous train/validation/test day ranges whose transaction
//! volumes best approximate the target ratios.

pub mod optimizer;

pub use optimizer::{SplitOptimizer, SplitPlan, SplitRatios};
