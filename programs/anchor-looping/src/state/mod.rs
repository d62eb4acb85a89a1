//! Authority derivation and obligation status
//!
//! The program owns no account layout of its own: the obligation, user
//! metadata and farm state are klend/farms accounts.

pub mod authority;
pub mod obligation;

pub use authority::*;
pub use obligation::*;
