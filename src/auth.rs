//! Token kernel: redacted secrets, expiry claims, token sources, and the
//! refresh-coordinating cache.

pub mod cache;
pub mod claims;
pub mod secret;
pub mod source;

pub use cache::*;
pub use claims::*;
pub use secret::*;
pub use source::*;
