//! Instruction handlers

pub mod initialize;
pub mod deposit;
pub mod looping;
pub mod repay;
pub mod utils;

pub use initialize::*;
pub use deposit::*;
pub use looping::*;
pub use repay::*;
pub use utils::*;
