//! Cart module.
//!
//! Line identity and the cart store.

#[allow(clippy::module_inception)]
mod cart;
mod fingerprint;

pub use cart::{
    CartLimits, CartLine, CartSnapshot, CartStore, MAX_OBSERVATION_CHARS, MAX_QUANTITY_PER_LINE,
};
pub use fingerprint::{fingerprint, Fingerprint};
