//! Rule: Unused Instruction
//!
//! Warns about an instruction that no `EXEC_INST` or `EXEC_COND_MAP` ever
//! runs. This is a warning, not an error: the program is still valid.

use std::collections::HashSet;

use crate::executor::types::ast::{Program, Stmt};

use super::super::{ValidationError, ValidationRule};

pub struct UnusedInstructionRule;

impl ValidationRule for UnusedInstructionRule {
    fn id(&self) -> &'static str {
        "unused-instruction"
    }

    fn description(&self) -> &'static str {
        "Declared instructions should be executed"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let executed: HashSet<&str> = program
            .statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::ExecuteInstruction { instruction, .. }
                | Stmt::ExecuteCondMap { instruction, .. } => Some(instruction.as_str()),
                _ => None,
            })
            .collect();

        program
            .statements
            .iter()
            .enumerate()
            .filter_map(|(index, stmt)| match stmt {
                Stmt::Instruction(inst) if !executed.contains(inst.name.as_str()) => {
                    Some(ValidationError::warning(
                        index,
                        inst.span,
                        format!("Instruction '{}' is declared but never executed", inst.name),
                        self.id(),
                    ))
                }
                _ => None,
            })
            .collect()
    }
}
