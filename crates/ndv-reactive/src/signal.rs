#![forbid(unsafe_code)]

//! Typed event channel with ordered, synchronous dispatch.
//!
//! # Design
//!
//! A [`Signal<E>`] owns an ordered list of listener slots. [`Signal::emit`]
//! snapshots the live slots, releases its borrow, then calls each listener
//! with `&E` in registration order. Because no borrow is held during
//! dispatch, listeners may connect, disconnect, or emit again.
//!
//! Two registration styles are offered:
//!
//! - [`Signal::connect`] returns a [`Connection`] id. The listener stays
//!   registered until [`Signal::disconnect`] is called with that id.
//! - [`Signal::subscribe`] returns a [`Subscription`] guard that disconnects
//!   the listener when dropped.
//!
//! # Failure Modes
//!
//! - **Listener connected mid-emit**: not called by the in-flight emission,
//!   only by later ones.
//! - **Listener disconnected mid-emit**: skipped for the remainder of the
//!   in-flight emission.
//! - **Listener panics**: the panic unwinds through `emit`; listeners after
//!   it are not called for that emission.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<dyn Fn(&E)>;

/// Handle identifying one listener registered with [`Signal::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    id: u64,
}

impl Connection {
    /// Numeric id, unique within the signal that issued it.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }
}

struct Slot<E> {
    id: u64,
    listener: Listener<E>,
    live: Rc<Cell<bool>>,
}

struct SignalInner<E> {
    name: &'static str,
    slots: Vec<Slot<E>>,
    next_id: u64,
    blocked: bool,
}

impl<E> SignalInner<E> {
    fn remove(&mut self, id: u64) -> bool {
        match self.slots.iter().position(|slot| slot.id == id) {
            Some(pos) => {
                let slot = self.slots.remove(pos);
                slot.live.set(false);
                true
            }
            None => false,
        }
    }
}

/// A typed publish/subscribe channel.
///
/// Cloning a `Signal` creates a new handle to the **same** listener list.
///
/// # Invariants
///
/// 1. Listeners are invoked in registration order.
/// 2. `emit` invokes every listener that was live when it started and is
///    still live when its turn comes, exactly once.
/// 3. A blocked signal drops emissions entirely; they are not queued.
pub struct Signal<E> {
    inner: Rc<RefCell<SignalInner<E>>>,
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("name", &inner.name)
            .field("listeners", &inner.slots.len())
            .field("blocked", &inner.blocked)
            .finish()
    }
}

impl<E: 'static> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Signal<E> {
    /// Create an unnamed signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::named("signal")
    }

    /// Create a signal whose name is attached to its trace events.
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                name,
                slots: Vec::new(),
                next_id: 0,
                blocked: false,
            })),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.borrow().name
    }

    /// Register a listener that stays connected until
    /// [`disconnect`](Self::disconnect) is called with the returned handle.
    pub fn connect(&self, listener: impl Fn(&E) + 'static) -> Connection {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(Slot {
            id,
            listener: Rc::new(listener),
            live: Rc::new(Cell::new(true)),
        });
        Connection { id }
    }

    /// Register a listener tied to the lifetime of the returned guard.
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let connection = self.connect(listener);
        let weak: Weak<RefCell<SignalInner<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            disconnect: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().remove(connection.id);
                }
            })),
        }
    }

    /// Remove a listener. Returns `false` if it was already disconnected.
    pub fn disconnect(&self, connection: Connection) -> bool {
        self.inner.borrow_mut().remove(connection.id)
    }

    /// Remove every listener.
    pub fn disconnect_all(&self) {
        let slots = std::mem::take(&mut self.inner.borrow_mut().slots);
        for slot in &slots {
            slot.live.set(false);
        }
    }

    /// Invoke every live listener with `event`, in registration order.
    pub fn emit(&self, event: &E) {
        let (name, slots) = {
            let inner = self.inner.borrow();
            if inner.blocked {
                tracing::trace!(signal = inner.name, "emit suppressed: signal blocked");
                return;
            }
            let slots: Vec<(Listener<E>, Rc<Cell<bool>>)> = inner
                .slots
                .iter()
                .map(|slot| (Rc::clone(&slot.listener), Rc::clone(&slot.live)))
                .collect();
            (inner.name, slots)
        };

        tracing::trace!(signal = name, listeners = slots.len(), "emit");
        for (listener, live) in &slots {
            if live.get() {
                listener(event);
            }
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Suppress emissions until [`unblock`](Self::unblock) is called.
    pub fn block(&self) {
        self.inner.borrow_mut().blocked = true;
    }

    pub fn unblock(&self) {
        self.inner.borrow_mut().blocked = false;
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.inner.borrow().blocked
    }
}

/// RAII guard for a listener registered with [`Signal::subscribe`].
///
/// Dropping the guard disconnects the listener immediately. If the signal
/// has already been dropped, dropping the guard does nothing.
#[must_use = "dropping a Subscription disconnects its listener"]
pub struct Subscription {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the listener connected for the rest of the signal's life.
    pub fn detach(mut self) {
        self.disconnect = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.disconnect.is_some())
            .finish()
    }
}
