//! Renderer-side event registry.
//!
//! The renderer embeds event identifiers in the markup it pushes; when the
//! host emits one of them back over the session, the renderer looks it up
//! here and runs the matching callback against its application state.
//!
//! Identifiers minted by [`EventRegistry::register`] (or the [`event!`](crate::event)
//! macro) are random v4 UUIDs, so a render can register callbacks without
//! coordinating names. Clear the registry before each full re-render to drop
//! callbacks that are no longer reachable from the markup.
//!
//! # Examples
//!
//! ```
//! use paro::registry::EventRegistry;
//!
//! let mut registry = EventRegistry::new(0u32);
//! let id = registry.register(|count: &mut u32| *count += 1);
//!
//! registry.call(&id).unwrap();
//! assert_eq!(*registry.state(), 1);
//! assert!(registry.call("unknown").is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by [`EventRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("callback id '{0}' is already registered")]
    Duplicate(String),

    #[error("callback '{0}' not found")]
    NotFound(String),
}

/// A boxed callback mutating the application state.
pub type Callback<S> = Box<dyn FnMut(&mut S) + Send + 'static>;

/// A registry shared between the render code and the event loop.
pub type SharedRegistry<S> = Arc<Mutex<EventRegistry<S>>>;

/// Callbacks keyed by event identifier, plus the state they act on.
pub struct EventRegistry<S> {
    callbacks: HashMap<String, Callback<S>>,
    state: S,
}

impl<S> EventRegistry<S> {
    pub fn new(state: S) -> Self {
        Self {
            callbacks: HashMap::new(),
            state,
        }
    }

    /// Wraps the registry for sharing with the [`event!`](crate::event) macro.
    pub fn shared(state: S) -> SharedRegistry<S> {
        Arc::new(Mutex::new(Self::new(state)))
    }

    /// Registers `callback` under an explicit id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if `id` is taken; the existing
    /// callback is kept.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        callback: impl FnMut(&mut S) + Send + 'static,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        if self.callbacks.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.callbacks.insert(id, Box::new(callback));
        Ok(())
    }

    /// Registers `callback` under a freshly minted id and returns the id.
    pub fn register(&mut self, callback: impl FnMut(&mut S) + Send + 'static) -> String {
        let id = loop {
            let id = Uuid::new_v4().to_string();
            if !self.callbacks.contains_key(&id) {
                break id;
            }
        };
        self.callbacks.insert(id.clone(), Box::new(callback));
        id
    }

    /// Runs the callback registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn call(&mut self, id: &str) -> Result<(), RegistryError> {
        let callback = self
            .callbacks
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;
        callback(&mut self.state);
        Ok(())
    }

    /// Drops every registered callback; the state is kept.
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.callbacks.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.callbacks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: fmt::Debug> fmt::Debug for EventRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("callbacks", &self.callbacks.len())
            .field("state", &self.state)
            .finish()
    }
}

/// Registers a callback on a [`SharedRegistry`] and evaluates to its new id.
///
/// The id is what the rendered markup hands to
/// [`Session::emit_event`](crate::session::Session::emit_event).
///
/// ```
/// use paro::event;
/// use paro::registry::EventRegistry;
///
/// let registry = EventRegistry::shared(Vec::<String>::new());
/// let id = event!(registry, |log: &mut Vec<String>| log.push("clicked".to_owned()));
/// let markup = format!(r#"<button data-event="{id}">click</button>"#);
///
/// registry.lock().call(&id).unwrap();
/// assert_eq!(registry.lock().state(), &vec!["clicked".to_owned()]);
/// assert!(markup.contains(&id));
/// ```
#[macro_export]
macro_rules! event {
    ($registry:expr, $callback:expr) => {
        $registry.lock().register($callback)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_call() {
        let mut registry = EventRegistry::new(Vec::new());
        registry
            .insert("add", |items: &mut Vec<u8>| items.push(1))
            .unwrap();

        registry.call("add").unwrap();
        registry.call("add").unwrap();
        assert_eq!(registry.state(), &vec![1, 1]);
    }

    #[test]
    fn duplicate_id_rejected_and_original_kept() {
        let mut registry = EventRegistry::new(0i32);
        registry.insert("x", |n: &mut i32| *n += 1).unwrap();

        let err = registry.insert("x", |n: &mut i32| *n -= 100).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("x".to_owned()));

        registry.call("x").unwrap();
        assert_eq!(*registry.state(), 1);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut registry = EventRegistry::new(());
        assert_eq!(
            registry.call("nope"),
            Err(RegistryError::NotFound("nope".to_owned()))
        );
    }

    #[test]
    fn minted_ids_are_unique_uuids() {
        let mut registry = EventRegistry::new(0u32);
        let a = registry.register(|n: &mut u32| *n += 1);
        let b = registry.register(|n: &mut u32| *n += 10);

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_eq!(registry.len(), 2);

        registry.call(&b).unwrap();
        assert_eq!(*registry.state(), 10);
    }

    #[test]
    fn clear_drops_callbacks_keeps_state() {
        let mut registry = EventRegistry::new(5u32);
        let id = registry.register(|n: &mut u32| *n += 1);
        registry.call(&id).unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.call(&id).is_err());
        assert_eq!(registry.into_state(), 6);
    }

    #[test]
    fn callbacks_keep_their_own_captures() {
        let mut registry = EventRegistry::new(Vec::new());
        let mut calls = 0;
        let id = registry.register(move |seen: &mut Vec<u32>| {
            calls += 1;
            seen.push(calls);
        });

        registry.call(&id).unwrap();
        registry.call(&id).unwrap();
        assert_eq!(registry.state(), &vec![1, 2]);
    }

    #[test]
    fn macro_registers_on_shared_registry() {
        let registry = EventRegistry::shared(0u32);
        let id = crate::event!(registry, |n: &mut u32| *n += 3);

        assert!(registry.lock().contains(&id));
        registry.lock().call(&id).unwrap();
        assert_eq!(*registry.lock().state(), 3);
    }

    #[test]
    fn remove_single_callback() {
        let mut registry = EventRegistry::new(());
        let id = registry.register(|_: &mut ()| {});
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
    }
}
