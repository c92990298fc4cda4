#![forbid(unsafe_code)]

//! Observable scalar attribute with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`) and pairs it with a [`Signal<T>`] that
//! carries the new value. When an assignment changes the value (determined
//! by `PartialEq`), the version is bumped and the signal fires.
//!
//! An optional *normalizer* rewrites every assigned value before the
//! comparison. Display models use it to enforce cross-field invariants,
//! e.g. coercing a channel axis that collides with a visible axis to `None`.
//!
//! # Performance
//!
//! | Operation     | Complexity                  |
//! |---------------|-----------------------------|
//! | `get()`       | O(1) + clone                |
//! | `set()`       | O(L) where L = listeners    |
//! | `connect()`   | O(1) amortized              |
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: calling `set()` from within a listener is allowed;
//!   the nested assignment notifies before the outer `set()` returns, so
//!   outer listeners later in the list observe the latest value.
//! - **Normalizer reads this observable**: panics (RefCell borrow rules) if
//!   the normalizer calls `set()` on the same observable. Normalizers must
//!   be pure functions of their input and *other* state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::signal::{Connection, Signal, Subscription};

type Normalizer<T> = Rc<dyn Fn(T) -> T>;

/// Shared interior for [`Observable<T>`].
struct ObservableInner<T> {
    value: T,
    version: u64,
    normalizer: Option<Normalizer<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state:
/// both handles see the same value and share listeners.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing mutation.
/// 2. `set(v)` where the normalized `v == current` is a no-op.
/// 3. Listeners are notified in registration order with the new value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
    changed: Signal<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            changed: self.changed.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("normalized", &inner.normalizer.is_some())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new observable with the given initial value.
    ///
    /// The initial version is 0 and no listeners are registered.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                normalizer: None,
            })),
            changed: Signal::named("value_changed"),
        }
    }

    /// Install a normalizer applied to every subsequently assigned value.
    ///
    /// The current value is left untouched.
    #[must_use]
    pub fn with_normalizer(self, normalizer: impl Fn(T) -> T + 'static) -> Self {
        self.inner.borrow_mut().normalizer = Some(Rc::new(normalizer));
        self
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Assign a new value. If the normalized value differs from the current
    /// one, the version is incremented and all listeners are notified.
    pub fn set(&self, value: T) {
        let normalizer = self.inner.borrow().normalizer.clone();
        let value = match normalizer {
            Some(normalize) => normalize(value),
            None => value,
        };
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Modify the value in place via a closure, then assign the result
    /// through [`set`](Self::set) so normalization and change detection
    /// apply as usual.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Register a persistent listener called with the new value after each
    /// change.
    pub fn connect(&self, listener: impl Fn(&T) + 'static) -> Connection {
        self.changed.connect(listener)
    }

    /// Register a listener tied to the returned guard's lifetime.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.changed.subscribe(listener)
    }

    pub fn disconnect(&self, connection: Connection) -> bool {
        self.changed.disconnect(connection)
    }

    /// The change signal itself, for blocking or bulk management.
    #[must_use]
    pub fn changed(&self) -> &Signal<T> {
        &self.changed
    }

    /// Current version number. Increments by 1 on each value-changing
    /// mutation. Useful for dirty-checking.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changed.listener_count()
    }

    fn notify(&self) {
        let value = self.get();
        tracing::trace!(version = self.version(), "observable changed");
        self.changed.emit(&value);
    }
}
