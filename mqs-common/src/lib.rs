#![warn(
    missing_docs,
    rust_2018_idioms,
    future_incompatible,
    missing_copy_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused,
    unused_qualifications,
    variant_size_differences
)]
#![cfg_attr(test, deny(warnings))]

//! Ambient stack shared by every backend that implements the `mqs-core` Queue contract.
//!
//! Today that is just structured logging: a `log::Log` implementation that writes one
//! JSON object per line. It is split out of `mqs-core` so a future adapter crate can
//! share the same logging conventions without depending on the in-memory engine.

#[macro_use]
extern crate serde_derive;

/// Structured JSON logging built on the `log` facade.
pub mod logger;
