//! Operation registry
//!
//! Every operation the library can attach to a prototype is described by an
//! [`Operation`] and grouped by the kind of receiver it expects. The default
//! table is built once per process and never changes afterwards.

use anyhow::Result;
use once_cell::sync::Lazy;
use protolib_core::{Effect, Group, Value};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Operation implementation type: receiver first, then declared parameters
pub type OperationFn = fn(&mut Value, &[Value]) -> Result<Value>;

/// A named operation with metadata
#[derive(Clone)]
pub struct Operation {
    /// The operation implementation
    pub func: OperationFn,

    /// The operation's name, unique within its group
    pub name: String,

    /// Group whose values act as receivers
    pub group: Group,

    /// Minimum number of arguments, receiver excluded
    pub min_args: usize,

    /// Maximum number of arguments (None for variadic)
    pub max_args: Option<usize>,

    /// Effects this operation may perform
    pub effects: Vec<Effect>,

    /// Documentation string
    pub doc: String,
}

impl Operation {
    /// Create an operation that leaves its receiver untouched
    pub fn pure(
        group: Group,
        name: impl Into<String>,
        func: OperationFn,
        min_args: usize,
        max_args: Option<usize>,
        doc: impl Into<String>,
    ) -> Self {
        Self::effectful(group, name, func, min_args, max_args, vec![], doc)
    }

    /// Create an operation that mutates its receiver in place
    pub fn mutating(
        group: Group,
        name: impl Into<String>,
        func: OperationFn,
        min_args: usize,
        max_args: Option<usize>,
        doc: impl Into<String>,
    ) -> Self {
        Self::effectful(
            group,
            name,
            func,
            min_args,
            max_args,
            vec![Effect::Mutation],
            doc,
        )
    }

    /// Create an operation with explicit effects
    pub fn effectful(
        group: Group,
        name: impl Into<String>,
        func: OperationFn,
        min_args: usize,
        max_args: Option<usize>,
        effects: Vec<Effect>,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            func,
            name: name.into(),
            group,
            min_args,
            max_args,
            effects,
            doc: doc.into(),
        }
    }

    /// `group:name`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }

    /// Whether the operation mutates its receiver
    pub fn is_mutating(&self) -> bool {
        self.effects.contains(&Effect::Mutation)
    }

    /// Validate argument count
    pub fn validate_args(&self, arg_count: usize) -> Result<()> {
        if arg_count < self.min_args {
            anyhow::bail!(
                "{}: expected at least {} arguments, got {}",
                self.qualified_name(),
                self.min_args,
                arg_count
            );
        }

        if let Some(max) = self.max_args {
            if arg_count > max {
                anyhow::bail!(
                    "{}: expected at most {} arguments, got {}",
                    self.qualified_name(),
                    max,
                    arg_count
                );
            }
        }

        Ok(())
    }

    /// Call the operation with receiver and argument validation
    pub fn call(&self, receiver: &mut Value, args: &[Value]) -> Result<Value> {
        if Group::of(receiver) != Some(self.group) {
            anyhow::bail!(
                "{}: expected {} receiver, got {}",
                self.qualified_name(),
                self.group,
                receiver.type_name()
            );
        }
        self.validate_args(args.len())?;
        (self.func)(receiver, args)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("effects", &self.effects)
            .finish()
    }
}

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Registry of operations, ordered within each group
#[derive(Clone, Debug, Default)]
pub struct Registry {
    groups: FxHashMap<Group, Vec<Operation>>,
}

impl Registry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in operation
    pub fn new() -> Self {
        let mut registry = Self::empty();
        crate::strings::register(&mut registry);
        crate::paths::register(&mut registry);
        crate::arrays::register(&mut registry);
        crate::objects::register(&mut registry);
        crate::errors::register(&mut registry);
        registry
    }

    /// The process-wide built-in registry
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Register an operation; a name already present in the group is replaced in place
    pub fn register(&mut self, op: Operation) {
        let ops = self.groups.entry(op.group).or_default();
        match ops.iter_mut().find(|existing| existing.name == op.name) {
            Some(existing) => *existing = op,
            None => ops.push(op),
        }
    }

    /// Register multiple operations at once
    pub fn register_all(&mut self, ops: Vec<Operation>) {
        for op in ops {
            self.register(op);
        }
    }

    /// Look up an operation by group and name
    pub fn get(&self, group: Group, name: &str) -> Option<&Operation> {
        self.operations(group).iter().find(|op| op.name == name)
    }

    /// Look up an operation by its `group:name` form
    pub fn lookup(&self, qualified: &str) -> Option<&Operation> {
        let (group, name) = qualified.split_once(':')?;
        self.get(group.parse().ok()?, name)
    }

    /// Check if an operation exists
    pub fn contains(&self, group: Group, name: &str) -> bool {
        self.get(group, name).is_some()
    }

    /// Operations of one group in registration order
    pub fn operations(&self, group: Group) -> &[Operation] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every `group:name`, groups in canonical order
    pub fn qualified_names(&self) -> Vec<String> {
        Group::ALL
            .iter()
            .flat_map(|group| self.operations(*group))
            .map(Operation::qualified_name)
            .collect()
    }

    /// Total number of operations
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
