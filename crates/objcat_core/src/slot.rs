//! Slots: a stable id bound to a strong or weak hold on one object.

use crate::types::{Custody, SlotId};
use std::fmt;
use std::rc::{Rc, Weak};

enum Hold<T> {
    Strong(Rc<T>),
    Weak(Weak<T>),
    Released,
}

/// The catalog's record for one tracked object.
///
/// A slot materializes to its object while the object is reachable: always
/// under [`Custody::Strong`], and until every other owner drops it under
/// [`Custody::Weak`]. Once disposed, a slot is a tombstone and materializes
/// to `None` forever, but its id stays valid.
pub struct Slot<T> {
    id: SlotId,
    hold: Hold<T>,
}

impl<T> Slot<T> {
    /// Creates a slot holding `item` with the given custody.
    pub fn new(id: SlotId, item: &Rc<T>, custody: Custody) -> Self {
        let hold = match custody {
            Custody::Strong => Hold::Strong(Rc::clone(item)),
            Custody::Weak => Hold::Weak(Rc::downgrade(item)),
        };
        Self { id, hold }
    }

    /// Returns the slot id.
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Returns the object if it is still reachable.
    #[must_use]
    pub fn materialize(&self) -> Option<Rc<T>> {
        match &self.hold {
            Hold::Strong(item) => Some(Rc::clone(item)),
            Hold::Weak(item) => item.upgrade(),
            Hold::Released => None,
        }
    }

    /// Returns true if the slot holds exactly this allocation.
    ///
    /// Works without upgrading, so a reclaimed weak target never matches.
    #[must_use]
    pub fn holds(&self, item: &Rc<T>) -> bool {
        match &self.hold {
            Hold::Strong(held) => Rc::ptr_eq(held, item),
            Hold::Weak(held) => {
                held.strong_count() > 0 && std::ptr::eq(held.as_ptr(), Rc::as_ptr(item))
            }
            Hold::Released => false,
        }
    }

    /// Releases the hold. Idempotent.
    pub fn dispose(&mut self) {
        self.hold = Hold::Released;
    }

    /// Returns true if the slot can no longer materialize.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        match &self.hold {
            Hold::Strong(_) => false,
            Hold::Weak(item) => item.strong_count() == 0,
            Hold::Released => true,
        }
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.hold {
            Hold::Strong(_) => "strong",
            Hold::Weak(item) if item.strong_count() > 0 => "weak",
            Hold::Weak(_) => "reclaimed",
            Hold::Released => "released",
        };
        f.debug_struct("Slot")
            .field("id", &self.id)
            .field("hold", &state)
            .finish()
    }
}
