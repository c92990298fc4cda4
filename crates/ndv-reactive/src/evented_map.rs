#![forbid(unsafe_code)]

//! Insertion-ordered mapping with a default policy and change events.
//!
//! [`EventedMap<K, V>`] stores key/value entries and announces every
//! mutation on its signals:
//!
//! | Mutation                    | Signal           | Payload                 |
//! |-----------------------------|------------------|-------------------------|
//! | first write of a key        | `item_added`     | [`ItemAdded`]           |
//! | write to an existing key    | `item_changed`   | [`ItemChanged`]         |
//! | removal                     | `item_removed`   | [`ItemRemoved`]         |
//! | bulk [`update`] start / end | `update_started` / `update_finished` | `()` |
//!
//! Reads go through a two-tier lookup: the explicit store first, then the
//! installed default (see [`EventedMap::set_default`]). Reading a key with
//! neither is a [`MapError::KeyNotFound`].
//!
//! # Validation
//!
//! Optional key and value validators run on every write, including
//! [`set_default`](EventedMap::set_default) and
//! [`with_entries`](EventedMap::with_entries). The plain constructors
//! [`from_entries`](EventedMap::from_entries) and
//! [`with_default`](EventedMap::with_default) store data as given, as does
//! deserialization, which yields a map with no validators. With
//! [`with_validate_lookup`](EventedMap::with_validate_lookup), keys are
//! also validated on reads and removals. A rejected write leaves the map
//! unchanged and emits nothing.
//!
//! Keys are compared with `Eq` only. A map never treats two keys as equal
//! because their textual forms match; install a key validator if some
//! normalization is wanted.
//!
//! [`update`]: EventedMap::update

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::cell::RefCell;

use crate::error::MapError;
use crate::signal::Signal;

type KeyValidator<K> = Rc<dyn Fn(K) -> Result<K, MapError>>;
type ValueValidator<V> = Rc<dyn Fn(V) -> Result<V, MapError>>;

/// Payload of `item_added`: a key received its first value.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAdded<K, V> {
    pub key: K,
    pub value: V,
}

/// Payload of `item_changed`: an existing key's value was replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChanged<K, V> {
    pub key: K,
    pub old: V,
    pub new: V,
}

/// Payload of `item_removed`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRemoved<K, V> {
    pub key: K,
    pub value: V,
}

struct MapState<K, V> {
    entries: Vec<(K, V)>,
    positions: HashMap<K, usize>,
    default: Option<V>,
}

impl<K: Clone + Eq + Hash, V> MapState<K, V> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            default: None,
        }
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.positions.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Store `value`, returning the value it replaced.
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.positions.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let pos = self.positions.remove(key)?;
        let entry = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(p) = self.positions.get_mut(k) {
                *p -= 1;
            }
        }
        Some(entry)
    }
}

struct MapSignals<K, V> {
    item_added: Signal<ItemAdded<K, V>>,
    item_changed: Signal<ItemChanged<K, V>>,
    item_removed: Signal<ItemRemoved<K, V>>,
    update_started: Signal<()>,
    update_finished: Signal<()>,
}

impl<K: 'static, V: 'static> MapSignals<K, V> {
    fn new() -> Self {
        Self {
            item_added: Signal::named("item_added"),
            item_changed: Signal::named("item_changed"),
            item_removed: Signal::named("item_removed"),
            update_started: Signal::named("update_started"),
            update_finished: Signal::named("update_finished"),
        }
    }
}

/// An insertion-ordered, observable key/value mapping.
///
/// Cloning an `EventedMap` creates a new handle to the **same** entries,
/// default, and signals.
///
/// # Invariants
///
/// 1. The first successful `set` of a key emits exactly one `item_added`
///    and no `item_changed`; every later `set` of that key emits exactly one
///    `item_changed` and no `item_added`.
/// 2. For any key without an explicit entry, `get` returns the most
///    recently installed default.
/// 3. `entries()` lists keys in the order they were first added; replacing
///    a value keeps its position.
pub struct EventedMap<K, V> {
    state: Rc<RefCell<MapState<K, V>>>,
    signals: Rc<MapSignals<K, V>>,
    key_validator: Option<KeyValidator<K>>,
    value_validator: Option<ValueValidator<V>>,
    validate_lookup: bool,
}

impl<K, V> Clone for EventedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            signals: Rc::clone(&self.signals),
            key_validator: self.key_validator.clone(),
            value_validator: self.value_validator.clone(),
            validate_lookup: self.validate_lookup,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EventedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.write_str("EventedMap(")?;
        f.debug_map()
            .entries(state.entries.iter().map(|(k, v)| (k, v)))
            .finish()?;
        if let Some(default) = &state.default {
            write!(f, ", default={default:?}")?;
        }
        f.write_str(")")
    }
}

impl<K, V> Default for EventedMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EventedMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    V: Clone + 'static,
{
    /// Create an empty map with no default and no validators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MapState::new())),
            signals: Rc::new(MapSignals::new()),
            key_validator: None,
            value_validator: None,
            validate_lookup: false,
        }
    }

    /// Create a map pre-populated with `entries`, without emitting events.
    ///
    /// Later duplicates overwrite earlier ones in place. The new map has no
    /// validators yet, so entries are stored as given; chain
    /// [`with_entries`](Self::with_entries) after installing validators to
    /// have them checked.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let map = Self::new();
        {
            let mut state = map.state.borrow_mut();
            for (k, v) in entries {
                state.insert(k, v);
            }
        }
        map
    }

    /// Install a default as part of construction, bypassing the value
    /// validator. Use [`set_default`](Self::set_default) for a validated
    /// default.
    #[must_use]
    pub fn with_default(self, value: V) -> Self {
        self.state.borrow_mut().default = Some(value);
        self
    }

    /// Validate (and possibly normalize) every key written to the map.
    #[must_use]
    pub fn with_key_validator(
        mut self,
        validator: impl Fn(K) -> Result<K, MapError> + 'static,
    ) -> Self {
        self.key_validator = Some(Rc::new(validator));
        self
    }

    /// Validate (and possibly normalize) every value written to the map.
    #[must_use]
    pub fn with_value_validator(
        mut self,
        validator: impl Fn(V) -> Result<V, MapError> + 'static,
    ) -> Self {
        self.value_validator = Some(Rc::new(validator));
        self
    }

    /// Also run the key validator on reads and removals.
    #[must_use]
    pub fn with_validate_lookup(mut self, enabled: bool) -> Self {
        self.validate_lookup = enabled;
        self
    }

    /// Add `entries` through the validators, without emitting events.
    pub fn with_entries(self, entries: impl IntoIterator<Item = (K, V)>) -> Result<Self, MapError> {
        let mut validated = Vec::new();
        for (k, v) in entries {
            validated.push((self.validate_key(k)?, self.validate_value(v)?));
        }
        {
            let mut state = self.state.borrow_mut();
            for (k, v) in validated {
                state.insert(k, v);
            }
        }
        Ok(self)
    }

    // -- signals ----------------------------------------------------------

    #[must_use]
    pub fn item_added(&self) -> &Signal<ItemAdded<K, V>> {
        &self.signals.item_added
    }

    #[must_use]
    pub fn item_changed(&self) -> &Signal<ItemChanged<K, V>> {
        &self.signals.item_changed
    }

    #[must_use]
    pub fn item_removed(&self) -> &Signal<ItemRemoved<K, V>> {
        &self.signals.item_removed
    }

    #[must_use]
    pub fn update_started(&self) -> &Signal<()> {
        &self.signals.update_started
    }

    #[must_use]
    pub fn update_finished(&self) -> &Signal<()> {
        &self.signals.update_finished
    }

    // -- default policy ---------------------------------------------------

    /// Install the value returned for keys without an explicit entry.
    ///
    /// Emits nothing. Calling it again replaces the previous default.
    pub fn set_default(&self, value: V) -> Result<(), MapError> {
        let value = self.validate_value(value)?;
        self.state.borrow_mut().default = Some(value);
        tracing::debug!("evented map default installed");
        Ok(())
    }

    /// Remove the default, returning it.
    pub fn clear_default(&self) -> Option<V> {
        self.state.borrow_mut().default.take()
    }

    #[must_use]
    pub fn default_value(&self) -> Option<V> {
        self.state.borrow().default.clone()
    }

    // -- reads ------------------------------------------------------------

    /// The explicit value for `key`, else the default.
    ///
    /// # Errors
    ///
    /// [`MapError::KeyNotFound`] if the key is absent and no default is
    /// installed; [`MapError::InvalidKey`] if lookup validation rejects it.
    pub fn get(&self, key: &K) -> Result<V, MapError> {
        let key = self.lookup_key(key)?;
        let state = self.state.borrow();
        state
            .lookup(&key)
            .or(state.default.as_ref())
            .cloned()
            .ok_or_else(|| MapError::key_not_found(&key))
    }

    /// The explicit value for `key`, ignoring the default.
    ///
    /// Keys rejected by lookup validation read as absent.
    #[must_use]
    pub fn get_explicit(&self, key: &K) -> Option<V> {
        let key = self.lookup_key(key).ok()?;
        self.state.borrow().lookup(&key).cloned()
    }

    /// Whether `key` has an explicit entry.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_explicit(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in first-insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.state.borrow().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<V> {
        self.state.borrow().entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Snapshot of all explicit entries in first-insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)> {
        self.state.borrow().entries.clone()
    }

    // -- writes -----------------------------------------------------------

    /// Store `value` under `key`, returning the value it replaced.
    ///
    /// Emits `item_added` for a new key and `item_changed` for an existing
    /// one. Listeners run before this returns.
    pub fn set(&self, key: K, value: V) -> Result<Option<V>, MapError> {
        let key = self.validate_key(key)?;
        let value = self.validate_value(value)?;
        let previous = self.state.borrow_mut().insert(key.clone(), value.clone());

        match &previous {
            Some(old) => {
                tracing::trace!(key = ?key, "evented map item changed");
                self.signals.item_changed.emit(&ItemChanged {
                    key,
                    old: old.clone(),
                    new: value,
                });
            }
            None => {
                tracing::trace!(key = ?key, "evented map item added");
                self.signals.item_added.emit(&ItemAdded { key, value });
            }
        }
        Ok(previous)
    }

    /// Remove the explicit entry for `key` and emit `item_removed`.
    ///
    /// # Errors
    ///
    /// [`MapError::KeyNotFound`] if there is no explicit entry; the default
    /// is never removed by this call.
    pub fn remove(&self, key: &K) -> Result<V, MapError> {
        let key = self.lookup_key(key)?;
        let removed = self.state.borrow_mut().remove(&key);
        let (key, value) = removed.ok_or_else(|| MapError::key_not_found(&key))?;
        tracing::trace!(key = ?key, "evented map item removed");
        self.signals.item_removed.emit(&ItemRemoved {
            key,
            value: value.clone(),
        });
        Ok(value)
    }

    /// Remove every explicit entry in insertion order, emitting
    /// `item_removed` for each. The default is kept.
    pub fn clear(&self) {
        for key in self.keys() {
            // A listener may already have removed a later key.
            let _ = self.remove(&key);
        }
    }

    /// Apply `entries` as consecutive [`set`](Self::set) calls bracketed by
    /// `update_started` and `update_finished`.
    ///
    /// Stops at the first rejected entry; entries before it stay applied,
    /// and `update_finished` is still emitted.
    pub fn update(&self, entries: impl IntoIterator<Item = (K, V)>) -> Result<(), MapError> {
        self.signals.update_started.emit(&());
        let result = entries
            .into_iter()
            .try_for_each(|(k, v)| self.set(k, v).map(|_| ()));
        self.signals.update_finished.emit(&());
        result
    }

    fn validate_key(&self, key: K) -> Result<K, MapError> {
        match &self.key_validator {
            Some(validate) => validate(key),
            None => Ok(key),
        }
    }

    fn validate_value(&self, value: V) -> Result<V, MapError> {
        match &self.value_validator {
            Some(validate) => validate(value),
            None => Ok(value),
        }
    }

    fn lookup_key(&self, key: &K) -> Result<K, MapError> {
        if self.validate_lookup {
            self.validate_key(key.clone())
        } else {
            Ok(key.clone())
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! Maps serialize as a sequence of `[key, value]` pairs so keys keep
    //! their own types (a JSON object would stringify them) and order.

    use std::fmt;
    use std::hash::Hash;

    use serde::de::{Deserialize, Deserializer};
    use serde::ser::{Serialize, SerializeSeq, Serializer};

    use super::EventedMap;

    impl<K, V> Serialize for EventedMap<K, V>
    where
        K: Serialize,
        V: Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let state = self.state.borrow();
            let mut seq = serializer.serialize_seq(Some(state.entries.len()))?;
            for (k, v) in &state.entries {
                seq.serialize_element(&(k, v))?;
            }
            seq.end()
        }
    }

    impl<'de, K, V> Deserialize<'de> for EventedMap<K, V>
    where
        K: Deserialize<'de> + Clone + Eq + Hash + fmt::Debug + 'static,
        V: Deserialize<'de> + Clone + 'static,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let entries = Vec::<(K, V)>::deserialize(deserializer)?;
            Ok(Self::from_entries(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Key {
        Int(i64),
        Text(String),
    }

    fn text(s: &str) -> Key {
        Key::Text(s.to_string())
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Added(Key, i32),
        Changed(Key, i32, i32),
        Removed(Key, i32),
        Started,
        Finished,
    }

    fn recorded(map: &EventedMap<Key, i32>) -> Rc<RefCell<Vec<Event>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        map.item_added()
            .connect(move |e| l.borrow_mut().push(Event::Added(e.key.clone(), e.value)));
        let l = Rc::clone(&log);
        map.item_changed()
            .connect(move |e| l.borrow_mut().push(Event::Changed(e.key.clone(), e.old, e.new)));
        let l = Rc::clone(&log);
        map.item_removed()
            .connect(move |e| l.borrow_mut().push(Event::Removed(e.key.clone(), e.value)));
        let l = Rc::clone(&log);
        map.update_started().connect(move |_| l.borrow_mut().push(Event::Started));
        let l = Rc::clone(&log);
        map.update_finished().connect(move |_| l.borrow_mut().push(Event::Finished));
        log
    }

    #[test]
    fn first_set_adds_second_set_changes() {
        let map = EventedMap::new();
        let log = recorded(&map);

        assert_eq!(map.set(text("a"), 1), Ok(None));
        assert_eq!(map.set(text("a"), 2), Ok(Some(1)));

        assert_eq!(
            *log.borrow(),
            vec![Event::Added(text("a"), 1), Event::Changed(text("a"), 1, 2)]
        );
    }

    #[test]
    fn same_value_write_still_reports_change() {
        let map = EventedMap::new();
        let log = recorded(&map);
        map.set(Key::Int(1), 3).unwrap();
        map.set(Key::Int(1), 3).unwrap();
        assert_eq!(log.borrow()[1], Event::Changed(Key::Int(1), 3, 3));
    }

    #[test]
    fn keys_of_different_types_never_collide() {
        let map = EventedMap::new();
        let log = recorded(&map);

        map.set(text("5"), 1).unwrap();
        map.set(Key::Int(5), 4).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![Event::Added(text("5"), 1), Event::Added(Key::Int(5), 4)]
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&text("5")), Ok(1));
        assert_eq!(map.get(&Key::Int(5)), Ok(4));
    }

    #[test]
    fn get_without_default_is_key_not_found() {
        let map: EventedMap<Key, i32> = EventedMap::new();
        assert_eq!(
            map.get(&Key::Int(6)),
            Err(MapError::KeyNotFound {
                key: "Int(6)".to_string()
            })
        );
    }

    #[test]
    fn default_policy_covers_unset_keys_only() {
        let map = EventedMap::new();
        map.set(Key::Int(1), 10).unwrap();
        map.set_default(7).unwrap();

        assert_eq!(map.get(&Key::Int(6)), Ok(7));
        assert_eq!(map.get(&Key::Int(1)), Ok(10));
        assert_eq!(map.get_explicit(&Key::Int(6)), None);
        assert!(!map.contains_key(&Key::Int(6)));

        map.set_default(8).unwrap();
        assert_eq!(map.get(&Key::Int(6)), Ok(8));

        assert_eq!(map.clear_default(), Some(8));
        assert!(map.get(&Key::Int(6)).is_err());
    }

    #[test]
    fn set_default_emits_nothing() {
        let map = EventedMap::new();
        let log = recorded(&map);
        map.set_default(1).unwrap();
        map.set_default(2).unwrap();
        assert!(log.borrow().is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn class_level_default() {
        let map: EventedMap<Key, i32> = EventedMap::new().with_default(-1);
        assert_eq!(map.default_value(), Some(-1));
        assert_eq!(map.get(&text("missing")), Ok(-1));
    }

    #[test]
    fn remove_emits_and_reindexes() {
        let map = EventedMap::from_entries([(Key::Int(1), 1), (Key::Int(2), 2), (Key::Int(3), 3)]);
        let log = recorded(&map);

        assert_eq!(map.remove(&Key::Int(2)), Ok(2));
        assert_eq!(map.keys(), vec![Key::Int(1), Key::Int(3)]);
        assert_eq!(map.get(&Key::Int(3)), Ok(3));
        assert!(matches!(
            map.remove(&Key::Int(2)),
            Err(MapError::KeyNotFound { .. })
        ));

        map.set(Key::Int(3), 30).unwrap();
        assert_eq!(map.entries(), vec![(Key::Int(1), 1), (Key::Int(3), 30)]);
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Removed(Key::Int(2), 2),
                Event::Changed(Key::Int(3), 3, 30)
            ]
        );
    }

    #[test]
    fn clear_removes_in_order_and_keeps_default() {
        let map = EventedMap::from_entries([(text("x"), 1), (text("y"), 2)]).with_default(0);
        let log = recorded(&map);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(&text("x")), Ok(0));
        assert_eq!(
            *log.borrow(),
            vec![Event::Removed(text("x"), 1), Event::Removed(text("y"), 2)]
        );
    }

    #[test]
    fn update_is_bracketed() {
        let map = EventedMap::new();
        map.set(Key::Int(1), 1).unwrap();
        let log = recorded(&map);

        map.update([(Key::Int(1), 5), (Key::Int(2), 6)]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Started,
                Event::Changed(Key::Int(1), 1, 5),
                Event::Added(Key::Int(2), 6),
                Event::Finished
            ]
        );
    }

    #[test]
    fn insertion_order_is_preserved_across_replacement() {
        let map = EventedMap::new();
        map.set(text("b"), 1).unwrap();
        map.set(text("a"), 2).unwrap();
        map.set(text("b"), 3).unwrap();
        assert_eq!(map.keys(), vec![text("b"), text("a")]);
        assert_eq!(map.values(), vec![3, 2]);
    }

    #[test]
    fn rejected_write_changes_nothing() {
        let map = EventedMap::new()
            .with_value_validator(|v: i32| {
                if v >= 0 {
                    Ok(v)
                } else {
                    Err(MapError::invalid_value("must be non-negative"))
                }
            });
        let log = recorded(&map);

        assert!(map.set(Key::Int(1), -1).is_err());
        assert!(map.set_default(-1).is_err());
        assert!(map.is_empty());
        assert_eq!(map.default_value(), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn update_stops_at_first_rejection_but_finishes() {
        let map = EventedMap::new().with_value_validator(|v: i32| {
            if v < 100 {
                Ok(v)
            } else {
                Err(MapError::invalid_value("too large"))
            }
        });
        let log = recorded(&map);

        let result = map.update([(Key::Int(1), 1), (Key::Int(2), 200), (Key::Int(3), 3)]);
        assert!(result.is_err());
        assert_eq!(map.keys(), vec![Key::Int(1)]);
        assert_eq!(
            *log.borrow(),
            vec![Event::Started, Event::Added(Key::Int(1), 1), Event::Finished]
        );
    }

    #[test]
    fn key_validator_normalizes_writes_and_lookups() {
        let lowercase = |k: Key| match k {
            Key::Text(s) => Ok(Key::Text(s.to_lowercase())),
            Key::Int(i) if i < 0 => Err(MapError::invalid_key(&i, "negative")),
            other => Ok(other),
        };
        let strict = EventedMap::new()
            .with_key_validator(lowercase)
            .with_validate_lookup(true);
        strict.set(text("Time"), 1).unwrap();
        assert_eq!(strict.keys(), vec![text("time")]);
        assert_eq!(strict.get(&text("TIME")), Ok(1));
        assert!(matches!(
            strict.set(Key::Int(-1), 0),
            Err(MapError::InvalidKey { .. })
        ));
        assert!(!strict.contains_key(&Key::Int(-1)));

        let lax = EventedMap::new().with_key_validator(lowercase);
        lax.set(text("Time"), 1).unwrap();
        assert!(lax.get(&text("TIME")).is_err());
    }

    #[test]
    fn unvalidated_constructors_store_as_given() {
        let positive = |v: i32| {
            if v > 0 {
                Ok(v)
            } else {
                Err(MapError::invalid_value("must be positive"))
            }
        };
        let map: EventedMap<Key, i32> = EventedMap::from_entries([(Key::Int(1), -1)])
            .with_default(-2)
            .with_value_validator(positive);

        assert_eq!(map.get(&Key::Int(1)), Ok(-1));
        assert_eq!(map.get(&Key::Int(9)), Ok(-2));
        assert!(map.set_default(-3).is_err());
        assert!(map.set(Key::Int(2), -4).is_err());
        assert!(map.clone().with_entries([(Key::Int(3), -5)]).is_err());
        assert_eq!(map.keys(), vec![Key::Int(1)]);
    }

    #[test]
    fn with_entries_validates_silently() {
        let map = EventedMap::new()
            .with_key_validator(|k: Key| match k {
                Key::Text(s) => Ok(Key::Text(s.trim().to_string())),
                other => Ok(other),
            })
            .with_entries([(text(" z "), 1)])
            .unwrap();
        assert_eq!(map.keys(), vec![text("z")]);
    }

    #[test]
    fn listener_may_read_and_write_the_map() {
        let map: EventedMap<Key, i32> = EventedMap::new();
        let handle = map.clone();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = Rc::clone(&seen);
        map.item_added().connect(move |e| {
            seen_clone.set(handle.len());
            if e.key == Key::Int(1) {
                handle.set(Key::Int(2), e.value * 10).unwrap();
            }
        });

        map.set(Key::Int(1), 4).unwrap();
        assert_eq!(map.get(&Key::Int(2)), Ok(40));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn clone_shares_entries_and_signals() {
        let map: EventedMap<Key, i32> = EventedMap::new();
        let other = map.clone();
        let log = recorded(&map);

        other.set(Key::Int(9), 9).unwrap();
        assert_eq!(map.get(&Key::Int(9)), Ok(9));
        assert_eq!(*log.borrow(), vec![Event::Added(Key::Int(9), 9)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_ordered_pairs() {
        let map: EventedMap<Option<i64>, i32> =
            EventedMap::from_entries([(Some(5), 2), (None, 1)]).with_default(9);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "[[5,2],[null,1]]");

        let back: EventedMap<Option<i64>, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries(), map.entries());
        assert_eq!(back.default_value(), None);
    }

    #[test]
    fn debug_lists_entries_and_default() {
        let map = EventedMap::from_entries([(Key::Int(1), 2)]).with_default(0);
        assert_eq!(format!("{map:?}"), "EventedMap({Int(1): 2}, default=0)");
    }
}
