//! # foxdbf Configuration Module
//!
//! This module centralizes the format constants and pool tuning values for
//! foxdbf. Values that depend on each other are co-located and checked with
//! compile-time assertions.
//!
//! Runtime settings (storage backend, trim policy, pools) live on
//! [`crate::table::TableBuilder`].
//!
//! ## Module Organization
//!
//! - [`constants`]: All numeric configuration values with dependency documentation

pub mod constants;
pub use constants::*;
