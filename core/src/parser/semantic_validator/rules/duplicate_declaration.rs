//! Rule: Duplicate Declaration
//!
//! Instruction names must be unique, and so must condition names. The two
//! live in separate namespaces, so an instruction and a condition may share
//! a name. Empty names are rejected as well.

use std::collections::HashSet;

use crate::executor::types::ast::{Program, Stmt};

use super::super::{ValidationError, ValidationRule};

pub struct DuplicateDeclarationRule;

impl ValidationRule for DuplicateDeclarationRule {
    fn id(&self) -> &'static str {
        "duplicate-declaration"
    }

    fn description(&self) -> &'static str {
        "Instruction and condition names must be unique and non-empty"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut instructions = HashSet::new();
        let mut conditions = HashSet::new();
        let mut errors = Vec::new();

        for (index, stmt) in program.statements.iter().enumerate() {
            let (kind, name, seen) = match stmt {
                Stmt::Instruction(inst) => ("instruction", &inst.name, &mut instructions),
                Stmt::Condition(cond) => ("condition", &cond.name, &mut conditions),
                _ => continue,
            };

            if name.trim().is_empty() {
                errors.push(ValidationError::error(
                    index,
                    stmt.span(),
                    format!("Static check failed: {} name is null or empty.", capitalize(kind)),
                    self.id(),
                ));
                continue;
            }

            if !seen.insert(name.as_str()) {
                errors.push(ValidationError::error(
                    index,
                    stmt.span(),
                    format!("Static check failed: Duplicate {} name '{}'.", kind, name),
                    self.id(),
                ));
            }
        }

        errors
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
