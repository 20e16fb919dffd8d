//! Change feed for mirroring an observable source.
//!
//! A catalog built with [`Catalog::observe`](crate::Catalog::observe)
//! subscribes to its source and replays every change onto itself:
//!
//! - [`Change::Added`] becomes `add` per item
//! - [`Change::Removed`] becomes `remove` per item
//! - [`Change::Reset`] becomes `reset`
//!
//! # Usage
//!
//! ```rust,ignore
//! use objcat_core::{Catalog, CatalogConfig, ObservableVec};
//!
//! let source = Rc::new(ObservableVec::from_items(people));
//! let catalog = Catalog::observe(&source, CatalogConfig::default());
//!
//! // The catalog sees this push immediately
//! source.push(Rc::new(new_person));
//! ```
//!
//! Listeners are held weakly, so a dropped catalog never keeps receiving
//! notifications; dead listeners are pruned on the next emit.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A change to an observable source.
#[derive(Debug)]
pub enum Change<T> {
    /// Items were appended.
    Added(Vec<Rc<T>>),
    /// Items were removed.
    Removed(Vec<Rc<T>>),
    /// The source was cleared.
    Reset,
}

/// Receives changes from a feed.
pub trait ChangeListener<T> {
    /// Called once per change, after the source has applied it.
    fn on_change(&self, change: &Change<T>);
}

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A source of add/remove/reset notifications.
pub trait ChangeFeed<T> {
    /// Registers a listener. The feed holds it weakly.
    fn subscribe(&self, listener: Weak<dyn ChangeListener<T>>) -> SubscriptionId;

    /// Removes a listener. Returns false if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// A vector that notifies subscribers when it changes.
pub struct ObservableVec<T> {
    items: RefCell<Vec<Rc<T>>>,
    subscribers: RefCell<Vec<(SubscriptionId, Weak<dyn ChangeListener<T>>)>>,
    next_subscription: Cell<u64>,
}

impl<T> ObservableVec<T> {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Self::from_items(Vec::new())
    }

    /// Creates a vector holding `items`.
    pub fn from_items(items: impl IntoIterator<Item = Rc<T>>) -> Self {
        Self {
            items: RefCell::new(items.into_iter().collect()),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }
    }

    /// Appends one item.
    pub fn push(&self, item: Rc<T>) {
        self.items.borrow_mut().push(Rc::clone(&item));
        self.emit(&Change::Added(vec![item]));
    }

    /// Appends several items as one change.
    pub fn extend(&self, items: impl IntoIterator<Item = Rc<T>>) {
        let added: Vec<Rc<T>> = items.into_iter().collect();
        if added.is_empty() {
            return;
        }
        self.items.borrow_mut().extend(added.iter().cloned());
        self.emit(&Change::Added(added));
    }

    /// Removes the first entry that is this allocation.
    ///
    /// Returns false if the item was not present.
    pub fn remove(&self, item: &Rc<T>) -> bool {
        let removed = {
            let mut items = self.items.borrow_mut();
            match items.iter().position(|held| Rc::ptr_eq(held, item)) {
                Some(pos) => items.remove(pos),
                None => return false,
            }
        };
        self.emit(&Change::Removed(vec![removed]));
        true
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
        self.emit(&Change::Reset);
    }

    /// Returns the current items.
    pub fn snapshot(&self) -> Vec<Rc<T>> {
        self.items.borrow().clone()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Returns true if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }

    fn emit(&self, change: &Change<T>) {
        // Listeners may subscribe or unsubscribe from inside `on_change`,
        // so the list is not borrowed while they run.
        let listeners: Vec<Rc<dyn ChangeListener<T>>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|(_, listener)| listener.strong_count() > 0);
            subscribers
                .iter()
                .filter_map(|(_, listener)| listener.upgrade())
                .collect()
        };
        for listener in listeners {
            listener.on_change(change);
        }
    }
}

impl<T> ChangeFeed<T> for ObservableVec<T> {
    fn subscribe(&self, listener: Weak<dyn ChangeListener<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(held, _)| *held != id);
        subscribers.len() != before
    }
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("len", &self.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl ChangeListener<u32> for Recorder {
        fn on_change(&self, change: &Change<u32>) {
            let line = match change {
                Change::Added(items) => format!("add {}", items.len()),
                Change::Removed(items) => format!("remove {}", items.len()),
                Change::Reset => "reset".to_string(),
            };
            self.seen.borrow_mut().push(line);
        }
    }

    fn subscribe(feed: &ObservableVec<u32>, recorder: &Rc<Recorder>) -> SubscriptionId {
        let weak = Rc::downgrade(recorder);
        feed.subscribe(weak)
    }

    #[test]
    fn emits_in_order() {
        let feed = ObservableVec::new();
        let recorder = Rc::new(Recorder::default());
        subscribe(&feed, &recorder);

        let item = Rc::new(1);
        feed.push(Rc::clone(&item));
        feed.extend([Rc::new(2), Rc::new(3)]);
        assert!(feed.remove(&item));
        feed.clear();

        assert_eq!(
            *recorder.seen.borrow(),
            vec!["add 1", "add 2", "remove 1", "reset"]
        );
        assert!(feed.is_empty());
    }

    #[test]
    fn remove_missing_is_silent() {
        let feed = ObservableVec::from_items([Rc::new(1)]);
        let recorder = Rc::new(Recorder::default());
        subscribe(&feed, &recorder);

        assert!(!feed.remove(&Rc::new(1)));
        assert!(recorder.seen.borrow().is_empty());
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let feed = ObservableVec::new();
        let recorder = Rc::new(Recorder::default());
        let id = subscribe(&feed, &recorder);

        assert!(feed.unsubscribe(id));
        assert!(!feed.unsubscribe(id));
        feed.push(Rc::new(9));

        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn dropped_listener_is_pruned() {
        let feed = ObservableVec::new();
        let recorder = Rc::new(Recorder::default());
        subscribe(&feed, &recorder);
        assert_eq!(feed.subscriber_count(), 1);

        drop(recorder);
        feed.push(Rc::new(1));

        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(feed.subscribers.borrow().len(), 0);
    }

    #[test]
    fn empty_extend_emits_nothing() {
        let feed = ObservableVec::new();
        let recorder = Rc::new(Recorder::default());
        subscribe(&feed, &recorder);

        feed.extend(Vec::new());
        assert!(recorder.seen.borrow().is_empty());
    }
}
