//! Interfaces for external programs (klend, Jupiter) and swap authentication

pub mod klend;
pub mod jupiter;
pub mod swap_auth;

pub use klend::*;
pub use jupiter::*;
pub use swap_auth::*;
