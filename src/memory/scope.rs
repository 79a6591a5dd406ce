//! Scope chain implementation
//!
//! This module provides nested lexical environments:
//! - [`ScopeChain`]: Arena holding every scope created during a run
//! - [`Scope`]: One environment (global, function body or block)
//! - [`VariableSlot`]: A binding with its initialization status
//!
//! # Resolution
//!
//! Lookup starts at a given scope and walks `parent` links outward, returning
//! the first slot found. Parents are stored as [`ScopeId`]s, so a closure can
//! keep its defining scope alive without an ownership cycle.
//!
//! # Slot Status
//!
//! - `var` bindings are hoisted as [`SlotStatus::Uninitialized`] and read as `undefined`
//! - `let`/`const` bindings are hoisted as [`SlotStatus::Tdz`]; reading or
//!   writing them before their declaration runs is a `ReferenceError`
//! - Writing a name that resolves nowhere creates an implicit global

use super::value::Value;
use super::ScopeId;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Kind of lexical environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

impl ScopeKind {
    pub fn label(self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
        }
    }
}

/// Initialization status of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// Hoisted `var`, reads as `undefined`
    Uninitialized,
    /// Hoisted `let`/`const`, not yet declared
    Tdz,
    Initialized,
}

/// How a binding was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Var,
    Let,
    Const,
    Function,
    Param,
    /// Created by assigning to an undeclared name
    Implicit,
}

/// A variable binding
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSlot {
    pub status: SlotStatus,
    pub value: Value,
    pub binding: Binding,
}

/// One lexical environment
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    variables: FxHashMap<String, VariableSlot>,
    insertion_order: Vec<String>, // Track order of declarations
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            variables: FxHashMap::default(),
            insertion_order: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariableSlot> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Bindings in declaration order
    pub fn variables(&self) -> impl Iterator<Item = (&str, &VariableSlot)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.variables.get(name).map(|slot| (name.as_str(), slot)))
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    fn insert(&mut self, name: &str, slot: VariableSlot) {
        if self.variables.insert(name.to_string(), slot).is_none() {
            self.insertion_order.push(name.to_string());
        }
    }
}

/// Scope-level failures, located by the interpreter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScopeError {
    #[error("{name} is not defined")]
    NotDefined { name: String },

    #[error("Cannot access '{name}' before initialization")]
    TemporalDeadZone { name: String },

    #[error("Assignment to constant variable '{name}'")]
    ConstAssignment { name: String },
}

/// Arena of scopes; the global scope always has id 0
#[derive(Debug, Clone)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
        }
    }

    /// Create a new scope nested in `parent`
    pub fn create_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    /// Ids are only minted by [`ScopeChain::create_scope`], so indexing cannot fail
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Register `name` in `scope` with the hoisting state its binding implies.
    ///
    /// Redeclaring a `var` keeps the existing slot and value.
    pub fn declare(&mut self, scope: ScopeId, name: &str, binding: Binding) {
        let target = self.scope_mut(scope);
        let status = match binding {
            Binding::Var => {
                if target.contains(name) {
                    return;
                }
                SlotStatus::Uninitialized
            }
            Binding::Let | Binding::Const => SlotStatus::Tdz,
            Binding::Function | Binding::Param | Binding::Implicit => SlotStatus::Initialized,
        };
        target.insert(
            name,
            VariableSlot {
                status,
                value: Value::Undefined,
                binding,
            },
        );
    }

    /// Register `name` in `scope` already holding `value`, replacing any
    /// earlier slot of that name in the same scope
    pub fn declare_initialized(&mut self, scope: ScopeId, name: &str, binding: Binding, value: Value) {
        self.scope_mut(scope).insert(
            name,
            VariableSlot {
                status: SlotStatus::Initialized,
                value,
                binding,
            },
        );
    }

    /// Find the scope that owns `name`, starting at `from`
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            if scope.contains(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    /// Look up the slot for `name`, starting at `from`
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&VariableSlot> {
        self.resolve(from, name)
            .and_then(|id| self.scope(id).get(name))
    }

    /// Read a variable's value
    pub fn read(&self, from: ScopeId, name: &str) -> Result<Value, ScopeError> {
        let slot = self.lookup(from, name).ok_or_else(|| ScopeError::NotDefined {
            name: name.to_string(),
        })?;

        match slot.status {
            SlotStatus::Tdz => Err(ScopeError::TemporalDeadZone {
                name: name.to_string(),
            }),
            SlotStatus::Uninitialized | SlotStatus::Initialized => Ok(slot.value.clone()),
        }
    }

    /// Assign to an existing binding, or create an implicit global.
    ///
    /// Returns the scope the value landed in.
    pub fn write(&mut self, from: ScopeId, name: &str, value: Value) -> Result<ScopeId, ScopeError> {
        let Some(owner) = self.resolve(from, name) else {
            let global = Self::GLOBAL;
            self.declare(global, name, Binding::Implicit);
            self.set(global, name, value);
            return Ok(global);
        };

        if let Some(slot) = self.scope(owner).get(name) {
            if slot.status == SlotStatus::Tdz {
                return Err(ScopeError::TemporalDeadZone {
                    name: name.to_string(),
                });
            }
            if slot.binding == Binding::Const {
                return Err(ScopeError::ConstAssignment {
                    name: name.to_string(),
                });
            }
        }

        self.set(owner, name, value);
        Ok(owner)
    }

    /// Run a declaration's initializer: the binding leaves the TDZ, `const` included
    pub fn initialize(&mut self, from: ScopeId, name: &str, value: Value) -> Result<ScopeId, ScopeError> {
        let owner = self.resolve(from, name).ok_or_else(|| ScopeError::NotDefined {
            name: name.to_string(),
        })?;
        self.set(owner, name, value);
        Ok(owner)
    }

    fn set(&mut self, scope: ScopeId, name: &str, value: Value) {
        if let Some(slot) = self.scope_mut(scope).variables.get_mut(name) {
            slot.value = value;
            slot.status = SlotStatus::Initialized;
        }
    }

    /// Scope ids from `from` outward to the global scope
    pub fn chain(&self, from: ScopeId) -> Vec<ScopeId> {
        let mut ids = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            ids.push(id);
            current = self.scope(id).parent;
        }
        ids
    }

    /// The closest enclosing function or global scope, where `var` lands
    pub fn nearest_function_scope(&self, from: ScopeId) -> ScopeId {
        let mut current = from;
        loop {
            let scope = self.scope(current);
            match (scope.kind, scope.parent) {
                (ScopeKind::Block, Some(parent)) => current = parent,
                _ => return current,
            }
        }
    }

    /// Copy every binding of `from` into `to`, for per-iteration loop scopes
    pub fn copy_bindings(&mut self, from: ScopeId, to: ScopeId) {
        let source = self.scope(from);
        let copied: Vec<(String, VariableSlot)> = source
            .variables()
            .map(|(name, slot)| (name.to_string(), slot.clone()))
            .collect();

        let target = self.scope_mut(to);
        for (name, slot) in copied {
            target.insert(&name, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_is_readable_before_assignment() {
        let mut scopes = ScopeChain::new();
        scopes.declare(ScopeChain::GLOBAL, "x", Binding::Var);

        assert_eq!(scopes.read(ScopeChain::GLOBAL, "x"), Ok(Value::Undefined));
        assert_eq!(
            scopes.lookup(ScopeChain::GLOBAL, "x").unwrap().status,
            SlotStatus::Uninitialized
        );
    }

    #[test]
    fn test_tdz_read_and_write() {
        let mut scopes = ScopeChain::new();
        let block = scopes.create_scope(ScopeKind::Block, Some(ScopeChain::GLOBAL));
        scopes.declare(block, "y", Binding::Let);

        assert_eq!(
            scopes.read(block, "y"),
            Err(ScopeError::TemporalDeadZone {
                name: "y".to_string()
            })
        );
        assert!(scopes.write(block, "y", Value::Number(1.0)).is_err());

        scopes.initialize(block, "y", Value::Number(5.0)).unwrap();
        assert_eq!(scopes.read(block, "y"), Ok(Value::Number(5.0)));
    }

    #[test]
    fn test_lexical_resolution_prefers_innermost() {
        let mut scopes = ScopeChain::new();
        scopes.declare(ScopeChain::GLOBAL, "x", Binding::Let);
        scopes.initialize(ScopeChain::GLOBAL, "x", Value::Number(1.0)).unwrap();

        let func = scopes.create_scope(ScopeKind::Function, Some(ScopeChain::GLOBAL));
        scopes.declare(func, "x", Binding::Param);
        scopes.initialize(func, "x", Value::Number(2.0)).unwrap();

        assert_eq!(scopes.resolve(func, "x"), Some(func));
        assert_eq!(scopes.read(func, "x"), Ok(Value::Number(2.0)));
        assert_eq!(scopes.read(ScopeChain::GLOBAL, "x"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_not_defined() {
        let scopes = ScopeChain::new();
        assert_eq!(
            scopes.read(ScopeChain::GLOBAL, "nope"),
            Err(ScopeError::NotDefined {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_implicit_global() {
        let mut scopes = ScopeChain::new();
        let func = scopes.create_scope(ScopeKind::Function, Some(ScopeChain::GLOBAL));

        let owner = scopes.write(func, "leak", Value::Bool(true)).unwrap();
        assert_eq!(owner, ScopeChain::GLOBAL);
        assert_eq!(
            scopes.lookup(ScopeChain::GLOBAL, "leak").unwrap().binding,
            Binding::Implicit
        );
    }

    #[test]
    fn test_const_assignment() {
        let mut scopes = ScopeChain::new();
        scopes.declare(ScopeChain::GLOBAL, "k", Binding::Const);
        scopes.initialize(ScopeChain::GLOBAL, "k", Value::Number(1.0)).unwrap();

        assert!(matches!(
            scopes.write(ScopeChain::GLOBAL, "k", Value::Number(2.0)),
            Err(ScopeError::ConstAssignment { .. })
        ));
    }

    #[test]
    fn test_nearest_function_scope_skips_blocks() {
        let mut scopes = ScopeChain::new();
        let func = scopes.create_scope(ScopeKind::Function, Some(ScopeChain::GLOBAL));
        let block = scopes.create_scope(ScopeKind::Block, Some(func));
        let inner = scopes.create_scope(ScopeKind::Block, Some(block));

        assert_eq!(scopes.nearest_function_scope(inner), func);
        assert_eq!(scopes.chain(inner), vec![inner, block, func, ScopeChain::GLOBAL]);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let mut scopes = ScopeChain::new();
        for name in ["b", "a", "c"] {
            scopes.declare(ScopeChain::GLOBAL, name, Binding::Var);
        }
        let names: Vec<_> = scopes
            .scope(ScopeChain::GLOBAL)
            .variables()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_copy_bindings() {
        let mut scopes = ScopeChain::new();
        let first = scopes.create_scope(ScopeKind::Block, Some(ScopeChain::GLOBAL));
        scopes.declare(first, "i", Binding::Let);
        scopes.initialize(first, "i", Value::Number(0.0)).unwrap();

        let second = scopes.create_scope(ScopeKind::Block, Some(ScopeChain::GLOBAL));
        scopes.copy_bindings(first, second);
        scopes.write(second, "i", Value::Number(1.0)).unwrap();

        assert_eq!(scopes.read(first, "i"), Ok(Value::Number(0.0)));
        assert_eq!(scopes.read(second, "i"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_declare_initialized() {
        let mut scopes = ScopeChain::new();
        scopes.declare(ScopeChain::GLOBAL, "f", Binding::Var);
        scopes.declare(ScopeChain::GLOBAL, "g", Binding::Var);
        scopes.declare_initialized(ScopeChain::GLOBAL, "f", Binding::Function, Value::Number(1.0));

        let slot = scopes.lookup(ScopeChain::GLOBAL, "f").unwrap();
        assert_eq!(slot.status, SlotStatus::Initialized);
        assert_eq!(slot.binding, Binding::Function);
        assert_eq!(scopes.read(ScopeChain::GLOBAL, "f"), Ok(Value::Number(1.0)));

        // Replacing a slot keeps its place in declaration order
        let names: Vec<_> = scopes
            .scope(ScopeChain::GLOBAL)
            .variables()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["f", "g"]);
    }
}
