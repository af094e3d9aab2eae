use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-map of shared singletons. Each entry is an `Arc<T>`, so unsized
/// types such as trait objects can be registered too.
#[derive(Default)]
pub(crate) struct SharedMap {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl SharedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton. Returns `false` if one of this type already exists.
    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> bool {
        if self.contains::<T>() {
            return false;
        }
        self.map.insert(TypeId::of::<T>(), Box::new(value));
        true
    }

    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn insert_and_get_returns_same_instance() {
        let mut shared = SharedMap::new();
        let value = Arc::new(42u32);
        assert!(shared.insert(Arc::clone(&value)));
        let fetched = shared.get::<u32>().unwrap();
        assert!(Arc::ptr_eq(&value, &fetched));
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn second_insert_is_refused() {
        let mut shared = SharedMap::new();
        assert!(shared.insert(Arc::new(1u32)));
        assert!(!shared.insert(Arc::new(2u32)));
        assert_eq!(*shared.get::<u32>().unwrap(), 1);
    }

    #[test]
    fn trait_objects_are_keyed_by_their_view() {
        let mut shared = SharedMap::new();
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        shared.insert(greeter);
        assert_eq!(shared.get::<dyn Greeter>().unwrap().greet(), "hello");
        assert!(shared.get::<English>().is_none());
        assert!(!shared.contains::<English>());
    }
}
