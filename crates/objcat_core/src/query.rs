//! Chainable query cursor.
//!
//! A [`QueryResult`] is a filter (a sorted list of slot ids) plus a weak
//! back-reference to the catalog that produced it. Each `find` narrows the
//! filter by intersecting it with another index bucket; nothing is
//! materialized until [`get`](QueryResult::get) or
//! [`get_non_null`](QueryResult::get_non_null) is called.
//!
//! A cursor never keeps its catalog alive. If the catalog is dropped or
//! disposed, every further call yields an empty result.

use crate::catalog::{Accessor, CatalogState};
use crate::error::{CatalogError, CatalogResult};
use crate::index::IndexKey;
use crate::types::SlotId;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// The result of a catalog lookup, open to further narrowing.
///
/// `count` reports ids, not live objects: under weak custody some of them
/// may materialize to `None`.
pub struct QueryResult<T> {
    catalog: Weak<RefCell<CatalogState<T>>>,
    /// `None` means every slot in the catalog.
    filter: Option<Vec<SlotId>>,
}

impl<T: 'static> QueryResult<T> {
    pub(crate) fn unconstrained(catalog: Weak<RefCell<CatalogState<T>>>) -> Self {
        Self {
            catalog,
            filter: None,
        }
    }

    fn live(&self) -> Option<Rc<RefCell<CatalogState<T>>>> {
        self.catalog
            .upgrade()
            .filter(|state| !state.borrow().is_disposed())
    }

    fn narrow(&mut self, access_key: &str, probe: Option<&dyn Any>) {
        let ids = match self.live() {
            Some(state) => state
                .borrow()
                .lookup(access_key, probe, self.filter.as_deref()),
            None => Vec::new(),
        };
        self.filter = Some(ids);
    }

    fn lookup(&self, access_key: &str, probe: Option<&dyn Any>) -> Option<Rc<T>> {
        let state = self.live()?;
        let state = state.borrow();
        let ids = state.lookup(access_key, probe, self.filter.as_deref());
        state.first_live(&ids)
    }

    fn ensure_index<K: IndexKey>(&self, accessor: &Accessor<T, K>) -> CatalogResult<()> {
        CatalogError::check_access_key(accessor.name())?;
        if let Some(state) = self.live() {
            state.borrow_mut().ensure_index(accessor);
        }
        Ok(())
    }

    /// Narrows to the ids whose key under `access_key` equals `value`.
    ///
    /// `None` reads the null bucket.
    pub fn find<V: Any>(
        mut self,
        access_key: impl AsRef<str>,
        value: Option<&V>,
    ) -> CatalogResult<Self> {
        let access_key = CatalogError::check_access_key(access_key.as_ref())?;
        self.narrow(access_key, value.map(|v| v as &dyn Any));
        Ok(self)
    }

    /// Narrows to the ids whose key under `access_key` is `None`.
    pub fn find_null(mut self, access_key: impl AsRef<str>) -> CatalogResult<Self> {
        let access_key = CatalogError::check_access_key(access_key.as_ref())?;
        self.narrow(access_key, None);
        Ok(self)
    }

    /// Narrows by accessor, building its index on first use.
    pub fn find_by<K: IndexKey, V: Any>(
        mut self,
        accessor: &Accessor<T, K>,
        value: Option<&V>,
    ) -> CatalogResult<Self> {
        self.ensure_index(accessor)?;
        self.narrow(accessor.name(), value.map(|v| v as &dyn Any));
        Ok(self)
    }

    /// Returns the first live object within this result whose key equals
    /// `value`. Does not narrow the cursor.
    pub fn first<V: Any>(
        &self,
        access_key: impl AsRef<str>,
        value: Option<&V>,
    ) -> CatalogResult<Option<Rc<T>>> {
        let access_key = CatalogError::check_access_key(access_key.as_ref())?;
        Ok(self.lookup(access_key, value.map(|v| v as &dyn Any)))
    }

    /// Like [`first`](Self::first), by accessor.
    pub fn first_by<K: IndexKey, V: Any>(
        &self,
        accessor: &Accessor<T, K>,
        value: Option<&V>,
    ) -> CatalogResult<Option<Rc<T>>> {
        self.ensure_index(accessor)?;
        Ok(self.lookup(accessor.name(), value.map(|v| v as &dyn Any)))
    }

    /// Returns the number of ids in the result.
    pub fn count(&self) -> usize {
        match &self.filter {
            Some(ids) => ids.len(),
            None => self
                .live()
                .map_or(0, |state| state.borrow().slot_count()),
        }
    }

    /// Returns the ids in the result, ascending.
    pub fn ids(&self) -> Vec<SlotId> {
        match &self.filter {
            Some(ids) => ids.clone(),
            None => self
                .live()
                .map(|state| state.borrow().slot_ids())
                .unwrap_or_default(),
        }
    }

    /// Returns true if no `find` has been applied yet.
    pub fn is_unconstrained(&self) -> bool {
        self.filter.is_none()
    }

    /// Materializes the result, one entry per id.
    ///
    /// Entries are `None` for objects that have been reclaimed.
    pub fn get(&self) -> Vec<Option<Rc<T>>> {
        match self.live() {
            Some(state) => state.borrow().materialize_all(self.filter.as_deref()),
            None => Vec::new(),
        }
    }

    /// Materializes the result, skipping reclaimed objects.
    pub fn get_non_null(&self) -> Vec<Rc<T>> {
        self.get().into_iter().flatten().collect()
    }

    /// Returns the cursor for further narrowing.
    ///
    /// Reads naturally in a chain: `catalog.find(..)?.then().find(..)?`.
    #[must_use]
    pub fn then(self) -> Self {
        self
    }
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            catalog: Weak::clone(&self.catalog),
            filter: self.filter.clone(),
        }
    }
}

impl<T> fmt::Debug for QueryResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("filter", &self.filter)
            .field("catalog_alive", &(self.catalog.strong_count() > 0))
            .finish()
    }
}
