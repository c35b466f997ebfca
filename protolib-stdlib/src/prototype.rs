//! Shared method tables for the built-in value kinds
//!
//! A [`Prototype`] holds the operations currently bound for one group plus
//! the marker left by whichever library installed them. Bindings live beside
//! values rather than inside them, so a mapping's `keys` never reports them.

use crate::registry::Operation;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use protolib_core::{Error, Group, Result, Value};
use rustc_hash::FxHashMap;

/// Provenance recorded on a prototype by the last successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledMarker {
    /// Identifier of the installing library
    pub library: String,
    /// Packed version of the installing library
    pub version: u32,
}

/// Methods bound for one group
#[derive(Debug, Clone, Default)]
pub struct Prototype {
    methods: FxHashMap<String, Operation>,
    marker: Option<InstalledMarker>,
}

impl Prototype {
    pub fn marker(&self) -> Option<&InstalledMarker> {
        self.marker.as_ref()
    }

    pub(crate) fn marker_mut(&mut self) -> &mut Option<InstalledMarker> {
        &mut self.marker
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method(&self, name: &str) -> Option<&Operation> {
        self.methods.get(name)
    }

    /// Bind an operation under its own name, replacing any existing binding
    pub(crate) fn bind(&mut self, op: Operation) {
        self.methods.insert(op.name.clone(), op);
    }

    pub(crate) fn unbind(&mut self, name: &str) -> bool {
        self.methods.remove(name).is_some()
    }

    /// Bound method names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

static GLOBAL: Lazy<Prototypes> = Lazy::new(Prototypes::new);

/// The prototype of every group behind one lock
#[derive(Debug)]
pub struct Prototypes {
    table: RwLock<FxHashMap<Group, Prototype>>,
}

impl Default for Prototypes {
    fn default() -> Self {
        Self::new()
    }
}

impl Prototypes {
    /// A fresh table with nothing bound and no markers
    pub fn new() -> Self {
        let table = Group::ALL
            .iter()
            .map(|group| (*group, Prototype::default()))
            .collect();
        Self {
            table: RwLock::new(table),
        }
    }

    /// The process-wide table
    pub fn global() -> &'static Prototypes {
        &GLOBAL
    }

    pub fn marker(&self, group: Group) -> Option<InstalledMarker> {
        self.table.read().get(&group)?.marker().cloned()
    }

    pub fn method(&self, group: Group, name: &str) -> Option<Operation> {
        self.table.read().get(&group)?.method(name).cloned()
    }

    pub fn is_bound(&self, group: Group, name: &str) -> bool {
        self.table
            .read()
            .get(&group)
            .is_some_and(|proto| proto.is_bound(name))
    }

    /// Bound method names of one group, sorted
    pub fn methods(&self, group: Group) -> Vec<String> {
        self.table
            .read()
            .get(&group)
            .map(Prototype::names)
            .unwrap_or_default()
    }

    /// Run `f` against one group's prototype under the write lock
    pub(crate) fn update<R>(&self, group: Group, f: impl FnOnce(&mut Prototype) -> R) -> R {
        let mut table = self.table.write();
        f(table.entry(group).or_default())
    }

    /// Call a bound method on `receiver`
    pub fn invoke(&self, receiver: &mut Value, name: &str, args: &[Value]) -> Result<Value> {
        let group = Group::of(receiver).ok_or_else(|| {
            Error::Type(format!("{} values have no methods", receiver.type_name()))
        })?;
        // Clone out of the table so the lock is not held while the method runs.
        let op = self
            .method(group, name)
            .ok_or_else(|| Error::UnknownMethod {
                group: group.to_string(),
                name: name.to_string(),
            })?;
        Ok(op.call(receiver, args)?)
    }
}

/// Method-call syntax for values through the global prototypes
pub trait Invoke {
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value>;
}

impl Invoke for Value {
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        Prototypes::global().invoke(self, method, args)
    }
}
