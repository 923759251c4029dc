//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `duplicate_declaration.rs` - Instruction/condition names declared twice
//! - `undefined_reference.rs` - Executing something not declared earlier
//! - `instruction_parameters.rs` - Required parameters per action
//! - `parameter_keys.rs` - Generic parameter key allow-list (strict mode)
//! - `unused_instruction.rs` - Instructions that are never executed

mod duplicate_declaration;
mod instruction_parameters;
mod parameter_keys;
mod undefined_reference;
mod unused_instruction;

pub use duplicate_declaration::DuplicateDeclarationRule;
pub use instruction_parameters::InstructionParametersRule;
pub use parameter_keys::{ParameterKeysRule, ALLOWED_KEYS};
pub use undefined_reference::UndefinedReferenceRule;
pub use unused_instruction::UnusedInstructionRule;
