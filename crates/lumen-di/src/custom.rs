use std::fmt;
use std::sync::Arc;

use crate::injects::Injects;
use crate::slot::CustomDataInject;

/// Resolves to the first caller-supplied object stored under type `T`.
///
/// When no object matches the slot is left unresolved. Every injection pass
/// starts from scratch, so a value from an earlier pass is not carried over.
pub struct CustomInject<T: ?Sized + Send + Sync + 'static> {
    value: Option<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> CustomInject<T> {
    /// Unresolved slot.
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Whether the last pass found a matching object.
    pub fn is_injected(&self) -> bool {
        self.value.is_some()
    }

    /// The matched object, if any.
    pub fn get(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }
}

impl<T: ?Sized + Send + Sync + 'static> CustomDataInject for CustomInject<T> {
    fn fill(&self, injects: &Injects) -> Self {
        Self {
            value: injects.find::<T>(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for CustomInject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for CustomInject<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for CustomInject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomInject")
            .field("type", &std::any::type_name::<T>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Logger: Send + Sync {
        fn tag(&self) -> &str;
    }

    struct FileLogger(&'static str);

    impl Logger for FileLogger {
        fn tag(&self) -> &str {
            self.0
        }
    }

    struct Metrics;

    #[test]
    fn empty_list_leaves_slot_unresolved() {
        let slot = CustomInject::<dyn Logger>::new().fill(&Injects::new());
        assert!(!slot.is_injected());
    }

    #[test]
    fn single_non_matching_object_leaves_slot_unresolved() {
        let injects = Injects::new().with(Arc::new(Metrics));
        let slot = CustomInject::<dyn Logger>::new().fill(&injects);
        assert!(slot.get().is_none());
    }

    #[test]
    fn match_after_non_matching_objects_is_found() {
        for k in 0..4 {
            let mut injects = Injects::new();
            for _ in 0..k {
                injects.push(Arc::new(Metrics));
            }
            let logger: Arc<dyn Logger> = Arc::new(FileLogger("main"));
            injects.push(Arc::clone(&logger));

            let slot = CustomInject::<dyn Logger>::new().fill(&injects);
            assert!(Arc::ptr_eq(slot.get().unwrap(), &logger), "k = {k}");
        }
    }

    #[test]
    fn first_match_wins() {
        let first: Arc<dyn Logger> = Arc::new(FileLogger("first"));
        let second: Arc<dyn Logger> = Arc::new(FileLogger("second"));
        let injects = Injects::new().with(first).with(second);
        let slot = CustomInject::<dyn Logger>::new().fill(&injects);
        assert_eq!(slot.get().unwrap().tag(), "first");
    }

    #[test]
    fn concrete_view_does_not_match_trait_object_slot() {
        let injects = Injects::new().with(Arc::new(FileLogger("concrete")));
        assert!(!CustomInject::<dyn Logger>::new().fill(&injects).is_injected());
        assert!(CustomInject::<FileLogger>::new().fill(&injects).is_injected());
    }

    #[test]
    fn refill_discards_previous_value() {
        let injects = Injects::new().with(Arc::new(FileLogger("a")));
        let slot = CustomInject::<FileLogger>::new().fill(&injects);
        assert!(slot.is_injected());
        let slot = slot.fill(&Injects::new());
        assert!(!slot.is_injected());
    }
}
