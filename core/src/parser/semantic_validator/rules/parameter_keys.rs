//! Rule: Parameter Keys
//!
//! Restricts every parameter key to a fixed allow-list and requires a
//! non-empty key and value. The list is narrower than the keys the actions
//! actually consume (`name`, `count`, `recursive`, ... are absent), so this
//! rule is only registered by `Validator::strict()`.

use crate::executor::types::ast::{Parameter, Program, Stmt};

use super::super::{ValidationError, ValidationRule};

pub const ALLOWED_KEYS: &[&str] = &[
    "group_target",
    "path",
    "mode",
    "regex",
    "contains",
    "type",
    "file_type",
    "modified_date",
];

pub struct ParameterKeysRule;

impl ValidationRule for ParameterKeysRule {
    fn id(&self) -> &'static str {
        "parameter-keys"
    }

    fn description(&self) -> &'static str {
        "Parameter keys must come from the allow-list and have values"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (index, stmt) in program.statements.iter().enumerate() {
            let params = match stmt {
                Stmt::Instruction(inst) => &inst.params,
                Stmt::Condition(cond) => &cond.params,
                _ => continue,
            };
            for param in params {
                if let Some(message) = check_parameter(param) {
                    errors.push(ValidationError::error(index, param.span, message, self.id()));
                }
            }
        }

        errors
    }
}

fn check_parameter(param: &Parameter) -> Option<String> {
    if param.key.is_empty() {
        return Some("Static check failed: Parameter has an invalid or empty key.".to_string());
    }
    if param.value.is_empty() {
        return Some(format!(
            "Static check failed: Parameter with key '{}' has an empty value.",
            param.key
        ));
    }
    if !ALLOWED_KEYS.contains(&param.key.as_str()) {
        return Some(format!(
            "Static check failed: Parameter with key '{}' is invalid.",
            param.key
        ));
    }
    None
}
