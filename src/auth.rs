//! Signing keys, JWT segments, and the ES256 token issuer.

pub mod key;
pub mod token;

pub use key::*;
pub use token::{claims::*, secret::*, *};
