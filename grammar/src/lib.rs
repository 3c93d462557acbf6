//! Grammar analysis for LL(1) parser generation.
//!
//! Parses grammar descriptions, computes the FIRST and FOLLOW closures by
//! fixed-point iteration, and decides whether the grammar is LL(1).
//!
//! Run `cargo doc --open` to view this documentation in a browser.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::all)]

pub mod cfg;
mod compute;
pub mod error;
mod ll1;

pub use cfg::{Grammar, Symbol};
pub use error::Error;
