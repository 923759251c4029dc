//! Rule: Instruction Parameters
//!
//! Each action has required parameters:
//!
//! | action | requires |
//! |---|---|
//! | `:create_file`, `:create_folder` | exactly one of `name`/`namefile`; `path`; `count` (if given) a positive integer |
//! | `:group` | `group_target`, `path`, `mode` |
//! | `:rename` | `path`, `mode` |
//!
//! Keys are matched case-insensitively. A value that is a variable
//! reference satisfies the check; it is only known at run time. Any other
//! action is rejected. COUNT must fit a 32-bit signed integer.

use std::collections::HashMap;

use crate::executor::types::ast::{Action, Instruction, Program, Stmt};

use super::super::{is_deferred, ValidationError, ValidationRule};

pub struct InstructionParametersRule;

impl ValidationRule for InstructionParametersRule {
    fn id(&self) -> &'static str {
        "instruction-parameters"
    }

    fn description(&self) -> &'static str {
        "Instructions must declare the parameters their action requires"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (index, stmt) in program.statements.iter().enumerate() {
            let Stmt::Instruction(inst) = stmt else {
                continue;
            };
            for message in check_instruction(inst) {
                errors.push(ValidationError::error(index, inst.span, message, self.id()));
            }
        }

        errors
    }
}

fn check_instruction(inst: &Instruction) -> Vec<String> {
    let params: HashMap<String, &str> = inst
        .params
        .iter()
        .map(|p| (p.key.to_lowercase(), p.value.as_str()))
        .collect();

    match &inst.action {
        Action::CreateFile | Action::CreateFolder => check_create(&inst.action, &params),
        Action::Group => ["group_target", "path", "mode"]
            .into_iter()
            .filter(|key| !is_present(&params, key))
            .map(|key| {
                format!(
                    "Static check failed: {} parameter is required for :group instruction.",
                    key.to_uppercase()
                )
            })
            .collect(),
        Action::Rename => ["path", "mode"]
            .into_iter()
            .filter(|key| !is_present(&params, key))
            .map(|key| {
                format!(
                    "Static check failed: {} parameter is required for :rename instruction.",
                    key.to_uppercase()
                )
            })
            .collect(),
        Action::Unsupported(keyword) => vec![format!(
            "Static check failed: Unknown instruction type ':{}' for instruction '{}'.",
            keyword, inst.name
        )],
    }
}

fn check_create(action: &Action, params: &HashMap<String, &str>) -> Vec<String> {
    let mut messages = Vec::new();

    match (params.contains_key("name"), params.contains_key("namefile")) {
        (false, false) => messages.push(format!(
            "Static check failed: Either NAME or NAMEFILE must be specified for {} instruction.",
            action
        )),
        (true, true) => messages.push(format!(
            "Static check failed: Only one of NAME or NAMEFILE must be specified for {} instruction.",
            action
        )),
        _ => {}
    }

    if !is_present(params, "path") {
        messages.push(format!(
            "Static check failed: Invalid PATH parameter for {} instruction.",
            action
        ));
    }

    if let Some(count) = params.get("count") {
        if !is_deferred(count) {
            match count.trim().parse::<i32>() {
                Ok(n) if n > 0 => {}
                Ok(_) => messages.push(format!(
                    "Static check failed: COUNT parameter must be a positive integer for {} instruction.",
                    action
                )),
                Err(_) => messages.push(format!(
                    "Static check failed: COUNT parameter must be an integer for {} instruction.",
                    action
                )),
            }
        }
    }

    messages
}

/// Present with a non-blank value, or deferred to run time.
fn is_present(params: &HashMap<String, &str>, key: &str) -> bool {
    params
        .get(key)
        .is_some_and(|value| is_deferred(value) || !value.trim().is_empty())
}
