use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct InjectValue {
    view: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// Ordered list of caller-supplied objects for [`CustomInject`](crate::CustomInject) slots.
///
/// Each entry is stored under the view it was pushed as. Push the same object
/// several times to make it match several slot types, e.g. once as
/// `Arc<ConsoleLog>` and once as `Arc<dyn Log>`.
#[derive(Clone, Default)]
pub struct Injects {
    values: Vec<InjectValue>,
}

impl Injects {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object, builder style.
    pub fn with<T: ?Sized + Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.push(value);
        self
    }

    /// Append `value`, viewed as `T`.
    pub fn push<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.values.push(InjectValue {
            view: type_name::<T>(),
            value: Arc::new(value),
        });
    }

    /// First object stored under view `T`, in insertion order.
    pub fn find<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.values
            .iter()
            .find_map(|entry| entry.value.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no object was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Type names of the entries, in order.
    pub fn views(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|entry| entry.view)
    }
}

impl fmt::Debug for Injects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.views()).finish()
    }
}
