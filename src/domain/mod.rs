//! # Domain Layer
//!
//! Pure types for the request boundary: identifiers, fingerprints and rate
//! limit accounting. Nothing here touches the network, a lock or the clock.

pub mod value_objects;

pub use value_objects::*;
