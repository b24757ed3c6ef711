//! Data model shared by every generation stage.
//!
//! # Responsibility
//! - Define the declaration snapshot produced by discovery.
//! - Define the intermediate and final artifacts of one generation run.
//!
//! # Invariants
//! - Every value here is scoped to a single run and rebuilt from scratch.
//! - Discovery order is carried by `Vec` order and never re-sorted implicitly.

pub mod declaration;
pub mod unit;
