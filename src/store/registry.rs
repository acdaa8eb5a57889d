//! Ordered name registries for object classes and predicates.
//!
//! A registry is an append-or-rename-only list of unique names. The
//! position of a name is its category ID, and everything downstream of
//! the registries stores those positions instead of the names. An ID is
//! never reused or reordered: new names are only appended, and a rename
//! mutates the string at a fixed position without moving it.

use std::marker::PhantomData;

use crate::error::CurateError;
use crate::vr::{ClassId, PredicateId};

/// Ties a registry to the ID newtype it hands out and to the noun used
/// in error messages.
pub trait RegistryId: Copy {
    /// The noun for this registry's entries, e.g. "object class".
    const KIND: &'static str;

    /// Wraps a registry position in the ID newtype.
    fn from_index(index: usize) -> Self;

    /// Returns the wrapped registry position.
    fn index(self) -> usize;
}

impl RegistryId for ClassId {
    const KIND: &'static str = "object class";

    fn from_index(index: usize) -> Self {
        ClassId::new(index)
    }

    fn index(self) -> usize {
        self.0
    }
}

impl RegistryId for PredicateId {
    const KIND: &'static str = "predicate";

    fn from_index(index: usize) -> Self {
        PredicateId::new(index)
    }

    fn index(self) -> usize {
        self.0
    }
}

/// An ordered list of unique names whose positions are stable IDs.
#[derive(Clone, Debug, Default)]
pub struct Registry<Id: RegistryId> {
    names: Vec<String>,
    _id: PhantomData<Id>,
}

/// The object-class registry.
pub type ClassRegistry = Registry<ClassId>;

/// The predicate registry.
pub type PredicateRegistry = Registry<PredicateId>;

impl<Id: RegistryId> Registry<Id> {
    /// Creates a registry from an ordered list of names.
    ///
    /// The caller is trusted to supply unique names; persisted registry
    /// files are authored that way.
    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            names,
            _id: PhantomData,
        }
    }

    /// Returns the names in ID order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the registry holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Looks up the ID of a name.
    pub fn id_of(&self, name: &str) -> Option<Id> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(Id::from_index)
    }

    /// Looks up the name at an ID.
    pub fn name_of(&self, id: Id) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Looks up a name, failing with a reference error naming the
    /// registry kind when it is absent.
    pub fn require(&self, name: &str) -> Result<Id, CurateError> {
        self.id_of(name).ok_or_else(|| {
            CurateError::reference_global(format!("{} name not recognised: '{}'", Id::KIND, name))
        })
    }

    /// Appends a new name, returning its freshly assigned ID.
    ///
    /// Appending a name that already exists is a configuration error; it
    /// signals a stale vocabulary-extension list.
    pub fn append(&mut self, name: impl Into<String>) -> Result<Id, CurateError> {
        let name = name.into();
        if self.id_of(&name).is_some() {
            return Err(CurateError::config(format!(
                "new {} name already exists: '{}'",
                Id::KIND,
                name
            )));
        }
        self.names.push(name);
        Ok(Id::from_index(self.names.len() - 1))
    }

    /// Renames an entry in place. The entry keeps its ID.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> Result<Id, CurateError> {
        let id = self.require(from)?;
        self.names[id.index()] = to.into();
        Ok(id)
    }
}
