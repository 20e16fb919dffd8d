//! # objcat Core
//!
//! In-memory secondary indexing for a mutable collection of shared objects.
//!
//! This crate provides:
//! - Slots binding a stable id to a strong or weak hold on an object
//! - Hash indices over derived keys, optionally normalized
//! - A catalog that keeps every index in step with adds and removes
//! - A chainable query cursor that narrows results by intersection
//! - A change feed so a catalog can mirror an observable source
//!
//! ## Example
//!
//! ```rust,ignore
//! use objcat_core::{Catalog, CatalogConfig};
//! use std::rc::Rc;
//!
//! let people = vec![Rc::new(person_a), Rc::new(person_b)];
//! let catalog = Catalog::with_config(people.iter().cloned(), CatalogConfig::new().strong());
//!
//! catalog
//!     .add_index("city", |p: &Person| Some(p.city.clone()))?
//!     .add_normalized_index("name", |p: &Person| Some(p.name.clone()), |n| {
//!         n.map(|n| n.to_uppercase())
//!     })?;
//!
//! let hits = catalog
//!     .find("city", Some(&"Oslo"))?
//!     .find("name", Some(&"ADA"))?
//!     .get_non_null();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod change_feed;
mod config;
mod error;
pub mod index;
mod query;
mod slot;
mod stats;
mod types;

pub use catalog::{Accessor, Catalog};
pub use change_feed::{Change, ChangeFeed, ChangeListener, ObservableVec, SubscriptionId};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use index::{IndexKey, IndexKind};
pub use query::QueryResult;
pub use slot::Slot;
pub use stats::CatalogStats;
pub use types::{Custody, NullPolicy, SlotId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
