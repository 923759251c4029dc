//! Interpreter memory: the variable environment and the result registry.
//!
//! One `Memory` is created per interpreter run and handed to the evaluator
//! and instruction runner explicitly. Nothing here is global.
//!
//! ## Aliasing
//!
//! Every variable name points at a shared value cell. `B = "${A}"` makes `B`
//! point at `A`'s cell, so the two names observe the same value from then on:
//! assigning a literal through either name updates both. Assigning a new
//! reference to a name rebinds only that name.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::errors::MemoryError;
use super::types::ast::{is_variable_reference, Parameter};

/// Name the dynamic-construct syntax reserves for itself.
pub const RESERVED_ITERATOR: &str = "ITERATOR";

type Cell = Rc<RefCell<String>>;

/// Variables visible to parameter resolution.
#[derive(Debug, Default)]
pub struct Environment {
    cells: HashMap<String, Cell>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `key`. A `${NAME}` value aliases `key` to `NAME`.
    pub fn assign(&mut self, key: &str, value: &str) -> Result<(), MemoryError> {
        let key = key.trim();
        let value = value.trim();

        if key == RESERVED_ITERATOR {
            return Err(MemoryError::ReservedName);
        }

        if is_variable_reference(value) {
            let target = unwrap_reference(value)?;
            let Some(cell) = self.cells.get(target) else {
                return Err(MemoryError::UndefinedAlias(value.to_string()));
            };
            if target == key {
                return Err(MemoryError::CircularAssignment(value.to_string()));
            }
            let cell = Rc::clone(cell);
            self.cells.insert(key.to_string(), cell);
            return Ok(());
        }

        match self.cells.get(key) {
            Some(cell) => *cell.borrow_mut() = value.to_string(),
            None => {
                self.cells
                    .insert(key.to_string(), Rc::new(RefCell::new(value.to_string())));
            }
        }
        Ok(())
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Result<String, MemoryError> {
        self.cells
            .get(name)
            .map(|cell| cell.borrow().clone())
            .ok_or_else(|| MemoryError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// True when both names share one value cell.
    pub fn are_aliases(&self, a: &str, b: &str) -> bool {
        match (self.cells.get(a), self.cells.get(b)) {
            (Some(x), Some(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Strip `${` and `}` from a reference, rejecting `${}`.
fn unwrap_reference(wrapped: &str) -> Result<&str, MemoryError> {
    let inner = &wrapped[2..wrapped.len() - 1];
    if inner.is_empty() {
        return Err(MemoryError::EmptyReference);
    }
    Ok(inner)
}

/// The entries an instruction produced, plus the directory they live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub entries: Vec<PathBuf>,
    pub base_path: PathBuf,
}

impl ResultSet {
    pub fn new(entries: Vec<PathBuf>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            entries,
            base_path: base_path.into(),
        }
    }
}

/// Process-local interpreter state for a single run.
#[derive(Debug, Default)]
pub struct Memory {
    env: Environment,
    results: HashMap<String, ResultSet>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn assign(&mut self, key: &str, value: &str) -> Result<(), MemoryError> {
        self.env.assign(key, value)
    }

    pub fn get(&self, name: &str) -> Result<String, MemoryError> {
        self.env.get(name)
    }

    /// Resolve a raw parameter value: references are looked up now, anything
    /// else is returned unchanged.
    pub fn resolve(&self, raw: &str) -> Result<String, MemoryError> {
        if is_variable_reference(raw) {
            let name = unwrap_reference(raw)?;
            self.env.get(name)
        } else {
            Ok(raw.to_string())
        }
    }

    pub fn resolve_parameter(&self, param: &Parameter) -> Result<String, MemoryError> {
        self.resolve(&param.value)
    }

    /// Record what `instruction` produced, replacing any earlier record.
    pub fn store_result(&mut self, instruction: &str, entries: Vec<PathBuf>, base_path: &Path) {
        self.results.insert(
            instruction.to_string(),
            ResultSet::new(entries, base_path.to_path_buf()),
        );
    }

    pub fn has_result(&self, instruction: &str) -> bool {
        self.results.contains_key(instruction)
    }

    pub fn result(&self, instruction: &str) -> Result<&ResultSet, MemoryError> {
        self.results
            .get(instruction)
            .ok_or_else(|| MemoryError::UnknownResult(instruction.to_string()))
    }

    pub fn clear(&mut self) {
        self.clear_variables();
        self.clear_results();
    }

    pub fn clear_variables(&mut self) {
        self.env.clear();
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }
}
