use std::collections::HashMap;

use aurora_common::Span;

use super::types::Type;

/// How a variable was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// `let`: immutable.
    Let,
    /// `var`: mutable.
    Var,
    /// A function, method or constructor parameter: assignable.
    Parameter,
}

impl VariableKind {
    pub fn is_assignable(&self) -> bool {
        !matches!(self, VariableKind::Let)
    }
}

/// A declared local, field or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub kind: VariableKind,
    pub declared_at: Span,
}

/// The kind of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    /// Body of a function, method or constructor.
    Function,
    /// Any other `{ ... }`.
    Block,
}

/// A lexical scope: a map from name to variable with unique keys.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub variables: HashMap<String, Variable>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            variables: HashMap::new(),
        }
    }
}

/// Stack of nested scopes, innermost last.
///
/// The global scope sits at the bottom and is never popped, so the stack
/// always holds at least one scope.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global)],
        }
    }

    /// Push a new innermost scope of the given kind.
    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    /// Pop the innermost scope. Returns `None` (and pops nothing) when only
    /// the global scope is left.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.current().kind
    }

    fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    /// Define a variable in the innermost scope.
    /// Returns `Err` with the existing definition on duplicate; the existing
    /// entry is left untouched.
    pub fn define(&mut self, variable: Variable) -> Result<(), &Variable> {
        let idx = self.scopes.len() - 1;
        if self.scopes[idx].variables.contains_key(&variable.name) {
            return Err(&self.scopes[idx].variables[&variable.name]);
        }
        self.scopes[idx]
            .variables
            .insert(variable.name.clone(), variable);
        Ok(())
    }

    /// Look up a name in the innermost scope only.
    pub fn lookup_current(&self, name: &str) -> Option<&Variable> {
        self.current().variables.get(name)
    }

    /// Look up a name, walking from the innermost scope to the global one.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
    }
}
