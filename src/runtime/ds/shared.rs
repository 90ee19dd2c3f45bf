use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use uuid::Uuid;

use crate::runtime::ds::error::CoreError;

/// An access-controlled, single-slot channel.
///
/// `issue` mints a token for a value; `open` fails unless the token came
/// from this guard and the slot is empty, then deposits the token's value
/// and immediately drains it back out. The slot is occupied only for the
/// duration of one open, so an occupied slot at entry means opens are
/// happening reentrantly or out of order.
pub struct SharedGuard<T: Clone> {
    id: Uuid,
    channel: Rc<RefCell<Option<T>>>,
}

impl<T: Clone> SharedGuard<T> {
    pub fn new() -> SharedGuard<T> {
        SharedGuard {
            id: Uuid::new_v4(),
            channel: Rc::new(RefCell::new(None)),
        }
    }

    pub fn issue(&self, value: T) -> SafeToken<T> {
        SafeToken {
            guard_id: self.id,
            channel: self.channel.clone(),
            value,
        }
    }

    pub fn open(&self, token: &SafeToken<T>) -> Result<T, CoreError> {
        if self.channel.borrow().is_some() {
            warn!("capsule channel opened while occupied");
            return Err(CoreError::ReentrantAccess);
        }
        if token.guard_id != self.id {
            warn!("capsule token presented to a foreign guard");
            return Err(CoreError::AccessDenied);
        }

        token.deposit();
        let value = self.channel.borrow_mut().take();
        value.ok_or(CoreError::AccessDenied)
    }
}

impl<T: Clone> Default for SharedGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A capability token for one guarded value.
#[derive(Clone)]
pub struct SafeToken<T: Clone> {
    guard_id: Uuid,
    channel: Rc<RefCell<Option<T>>>,
    value: T,
}

impl<T: Clone> SafeToken<T> {
    /// Deposits the token's value into its guard's channel without draining
    /// it. A subsequent `open` on the same guard finds the slot occupied.
    pub fn deposit(&self) {
        *self.channel.borrow_mut() = Some(self.value.clone());
    }
}
