//! Amount arithmetic and repayment sizing

pub mod safe_math;
pub mod repay;

pub use safe_math::*;
pub use repay::*;
