use std::any::{type_name, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for types that can be stored in a component pool.
pub trait Component: 'static + Send + Sync {}

/// Any `'static + Send + Sync` type is a valid component.
impl<T: 'static + Send + Sync> Component for T {}

/// Runtime identity of a component type.
///
/// Equality, hashing and ordering only look at the `TypeId`, so a list of ids
/// can be sorted into a canonical order regardless of how it was built.
#[derive(Clone, Copy)]
pub struct ComponentId {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentId {
    /// Id of component type `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentId {}

impl Hash for ComponentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for ComponentId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComponentId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_id.cmp(&other.type_id)
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.name)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Sparse-set storage for one component type, keyed by entity index.
pub(crate) struct SparseSet<T> {
    /// Entity index -> position in `values`.
    lookup: Vec<Option<usize>>,
    values: Vec<T>,
    /// Entity index owning each entry of `values`.
    owners: Vec<u32>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            lookup: Vec::new(),
            values: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, index: u32, value: T) -> Option<T> {
        let idx = index as usize;
        if idx >= self.lookup.len() {
            self.lookup.resize(idx + 1, None);
        }
        match self.lookup[idx] {
            Some(dense) => Some(std::mem::replace(&mut self.values[dense], value)),
            None => {
                self.lookup[idx] = Some(self.values.len());
                self.values.push(value);
                self.owners.push(index);
                None
            }
        }
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        let dense = (*self.lookup.get(index as usize)?)?;
        self.values.get(dense)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let dense = (*self.lookup.get(index as usize)?)?;
        self.values.get_mut(dense)
    }

    /// Swap-remove the value for `index`.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let dense = self.lookup.get_mut(index as usize)?.take()?;
        let value = self.values.swap_remove(dense);
        self.owners.swap_remove(dense);
        if let Some(&moved) = self.owners.get(dense) {
            self.lookup[moved as usize] = Some(dense);
        }
        Some(value)
    }

    pub fn contains(&self, index: u32) -> bool {
        matches!(self.lookup.get(index as usize), Some(Some(_)))
    }

    pub fn owners(&self) -> &[u32] {
        &self.owners
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
