#![forbid(unsafe_code)]

//! Reactive containers for ndv display models.
//!
//! This crate provides the change-notification primitives the display
//! models are built from:
//!
//! - [`Signal`]: A typed event channel with ordered, synchronous dispatch.
//! - [`Observable`]: A shared, version-tracked scalar attribute that emits
//!   its new value on change.
//! - [`EventedMap`]: An insertion-ordered mapping with a default-value
//!   policy, optional validators, and add/change/remove notifications.
//!
//! # Architecture
//!
//! Every container is a cheap handle over `Rc<RefCell<..>>` state, so a
//! model can hand out clones of its fields and all of them observe the same
//! value and listeners. Dispatch never holds an internal borrow, which lets
//! a listener read the container that notified it, or mutate it again.
//!
//! # Invariants
//!
//! 1. Listeners run in registration order, on the caller's stack, before
//!    the mutating call returns.
//! 2. A write that fails validation changes nothing and emits nothing.
//! 3. `EventedMap` keys are compared with `Eq` only; no key coercion happens.

pub mod error;
pub mod evented_map;
pub mod observable;
pub mod signal;

pub use error::MapError;
pub use evented_map::{EventedMap, ItemAdded, ItemChanged, ItemRemoved};
pub use observable::Observable;
pub use signal::{Connection, Signal, Subscription};
