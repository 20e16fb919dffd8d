//! Index implementations for exact-match lookups.
//!
//! Indices map a derived key to the set of slot ids whose object produced
//! that key. They are maintained incrementally by the catalog on every add
//! and remove, so a query costs one hash lookup instead of a full scan.
//!
//! # Index Kinds
//!
//! - [`IndexKind::Direct`]: the key is the accessor's output
//! - [`IndexKind::Normalized`]: the key is `normalizer(accessor(item))`,
//!   so equivalent source values (say, differing only in case) share one
//!   bucket and queries pay no transform cost
//!
//! Both kinds share [`HashIndex`]; only the key function differs.

mod hash;
mod traits;

pub use hash::HashIndex;
pub use traits::{IndexKey, IndexKind, ValueIndex};
