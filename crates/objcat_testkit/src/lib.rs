//! # objcat Testkit
//!
//! Test utilities for objcat.
//!
//! This crate provides:
//! - Parent/child fixtures with scenario and performance data sets
//! - Seeded chaos for knocking holes into generated data
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use objcat_testkit::prelude::*;
//!
//! #[test]
//! fn finds_common_children() {
//!     let items = shared(scenario());
//!     let catalog = scenario_catalog(&items);
//!     assert_eq!(catalog.find("child_type_name", Some(&"CommonType"))?.count(), 2);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
