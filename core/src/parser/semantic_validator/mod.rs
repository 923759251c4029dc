//! Static checking for SimpleFiles programs
//!
//! Runs after parsing and before anything executes. A program with any
//! error-severity finding must not be run at all.
//!
//! # Usage
//!
//! ```ignore
//! use simplefiles_core::parser::{parse_program, semantic_validator::check_program};
//!
//! let program = parse_program(source)?;
//! check_program(&program)?;
//! ```
//!
//! # Architecture
//!
//! 1. **ValidationRule trait** - Each rule implements this trait
//! 2. **Validator** - Collects and runs all rules
//! 3. **ValidationError** - The output of validation (errors, warnings, hints)
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `semantic_validator/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

pub mod rules;

use crate::executor::types::ast::{Program, Span};

// ============================================================================
// Validation Error Types
// ============================================================================

/// A finding produced by static checking.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The source location of the issue
    pub span: Span,
    /// Index of the offending statement in the program
    pub statement: usize,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed - the program will not run
    Error,
    /// Should probably be fixed - potential mistake
    Warning,
    /// Suggestion for improvement
    Hint,
}

impl ValidationError {
    /// Create a new error
    pub fn error(
        statement: usize,
        span: Span,
        message: impl Into<String>,
        rule_id: &'static str,
    ) -> Self {
        Self {
            span,
            statement,
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    /// Create a new warning
    pub fn warning(
        statement: usize,
        span: Span,
        message: impl Into<String>,
        rule_id: &'static str,
    ) -> Self {
        Self {
            span,
            statement,
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    /// Check if this is an error (not a warning or hint)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        write!(
            f,
            "{} at line {}, col {}: {} [{}]",
            severity,
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message,
            self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules must implement.
///
/// Each rule checks one aspect of the program and does not depend on the
/// results of other rules.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "undefined-reference")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the validation and return any findings. Empty means no issues.
    fn validate(&self, program: &Program) -> Vec<ValidationError>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

/// The main validator that orchestrates all validation rules.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator with the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                // Error rules - these block execution
                Box::new(rules::DuplicateDeclarationRule),
                Box::new(rules::UndefinedReferenceRule),
                Box::new(rules::InstructionParametersRule),
                // Warning rules - these are suggestions
                Box::new(rules::UnusedInstructionRule),
            ],
        }
    }

    /// Built-in rules plus the parameter key allow-list.
    pub fn strict() -> Self {
        let mut validator = Self::new();
        validator.rules.insert(3, Box::new(rules::ParameterKeysRule));
        validator
    }

    /// Create a validator from `strict_parameter_keys`.
    pub fn with_strict(strict: bool) -> Self {
        if strict {
            Self::strict()
        } else {
            Self::new()
        }
    }

    /// Run all validation rules and collect findings in statement order.
    ///
    /// Findings for the same statement keep rule registration order.
    pub fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(program))
            .collect();
        errors.sort_by_key(|e| e.statement);
        errors
    }

    /// The first error in document order, if any.
    pub fn check(&self, program: &Program) -> Result<(), ValidationError> {
        match self.validate(program).into_iter().find(|e| e.is_error()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Get a list of all registered rules (useful for documentation)
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a program with the default rules and return all findings.
///
/// # Example
///
/// ```ignore
/// let program = parse_program(source)?;
/// for finding in validate_program(&program) {
///     eprintln!("{}", finding);
/// }
/// ```
pub fn validate_program(program: &Program) -> Vec<ValidationError> {
    Validator::new().validate(program)
}

/// Fail with the first error in document order.
pub fn check_program(program: &Program) -> Result<(), ValidationError> {
    Validator::new().check(program)
}

/// Check if a program has any validation errors (not just warnings).
pub fn has_errors(program: &Program) -> bool {
    validate_program(program).iter().any(|e| e.is_error())
}

/// Parameter value that is a variable reference; checked at run time instead.
pub(crate) fn is_deferred(value: &str) -> bool {
    crate::executor::types::ast::is_variable_reference(value)
}

#[cfg(test)]
mod tests;
