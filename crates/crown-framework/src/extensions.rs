//! Shared, type-keyed state for modules.
//!
//! Modules that need state visible to the whole application (the layout
//! settings, the layout registry) store a cloneable *handle* in
//! [`Extensions`]. Every module registered with the same
//! [`ModuleRegistry`](crate::module::ModuleRegistry) sees the same handle, so a
//! later registration updates what an earlier one installed.
//!
//! Only one value per type can be stored; handles are expected to be cheap to
//! clone (typically an `Arc` around interior-mutable state).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

type ExtensionMap = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

/// A type-keyed map of shared handles.
#[derive(Clone, Default)]
pub struct Extensions {
    inner: Arc<RwLock<ExtensionMap>>,
}

impl Extensions {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<T>(&self, value: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner
            .write()
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Returns a clone of the stored value of type `T`.
    pub fn get<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns the stored value of type `T`, inserting `f()` first if absent.
    pub fn get_or_insert_with<T, F>(&self, f: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let mut map = self.inner.write();
        if let Some(existing) = map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
        {
            return existing.clone();
        }
        let value = f();
        map.insert(TypeId::of::<T>(), Box::new(value.clone()));
        value
    }

    /// Returns the stored value of type `T`, inserting `T::default()` first if absent.
    pub fn get_or_default<T>(&self) -> T
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        self.get_or_insert_with(T::default)
    }

    /// Returns `true` if a value of type `T` is stored.
    pub fn contains<T: 'static>(&self) -> bool {
        self.inner.read().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns the value of type `T`.
    pub fn remove<T: 'static>(&self) -> Option<T> {
        self.inner
            .write()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Removes every stored value.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Counter(Arc<AtomicUsize>);

    #[test]
    fn test_handles_are_shared() {
        let extensions = Extensions::new();
        let first: Counter = extensions.get_or_default();
        first.0.fetch_add(1, Ordering::SeqCst);

        let second: Counter = extensions.get_or_default();
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
        assert_eq!(extensions.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let extensions = Extensions::new();
        assert_eq!(extensions.insert(1u32), None);
        assert_eq!(extensions.insert(2u32), Some(1));
        assert_eq!(extensions.get::<u32>(), Some(2));
    }

    #[test]
    fn test_clones_share_storage() {
        let extensions = Extensions::new();
        let clone = extensions.clone();
        clone.insert("hello".to_string());
        assert!(extensions.contains::<String>());
        assert_eq!(extensions.remove::<String>().as_deref(), Some("hello"));
        assert!(clone.is_empty());
    }
}
