use crate::records::{Hunter, Stand};

/// A record addressable by numeric id and display name.
pub trait Keyed {
    fn id(&self) -> u32;
    fn name(&self) -> &str;
}

impl Keyed for Stand {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Keyed for Hunter {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Query helpers over an in-memory snapshot of one collection.
///
/// The repository owns the snapshot for the duration of an operation and
/// hands it back through [`into_inner`](Self::into_inner) for saving.
/// Lookups are linear; camp collections hold tens of records.
#[derive(Debug, Clone)]
pub struct Repository<T> {
    records: Vec<T>,
}

impl<T> Default for Repository<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Keyed> Repository<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn find_by_id(&self, id: u32) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: u32) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    /// First record with exactly this name. Names are not unique, so this
    /// answers "is the name taken", not "which record is it".
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.records.iter().find(|r| r.name() == name)
    }

    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }

    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    /// Remove and return the record with `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let idx = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.records
    }
}
