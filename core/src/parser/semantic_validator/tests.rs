//! Tests for the static checking rules

use super::*;
use crate::executor::types::ast::{Action, Instruction, Parameter, Stmt};
use crate::parser::parse_program;

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse source and validate, returning all findings
fn validate(source: &str) -> Vec<ValidationError> {
    let program = parse_program(source).expect("Parse should succeed");
    validate_program(&program)
}

fn validate_strict(source: &str) -> Vec<ValidationError> {
    let program = parse_program(source).expect("Parse should succeed");
    Validator::strict().validate(&program)
}

/// Check if errors contain a specific rule
fn has_rule(errors: &[ValidationError], rule_id: &str) -> bool {
    errors.iter().any(|e| e.rule_id == rule_id)
}

/// Get errors for a specific rule
fn for_rule<'a>(errors: &'a [ValidationError], rule_id: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.rule_id == rule_id).collect()
}

// ============================================================================
// Duplicate Declaration Tests
// ============================================================================

#[test]
fn test_duplicate_instruction() {
    let source = r#"
BEGIN
INST a -> :rename --> path = "/x" --> mode = "lower_case";
INST a -> :rename --> path = "/y" --> mode = "lower_case";
EXEC_INST a;
END
"#;

    let errors = validate(source);
    let dups = for_rule(&errors, "duplicate-declaration");
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].statement, 1);
    assert!(dups[0].message.contains("Duplicate instruction name 'a'"));
}

#[test]
fn test_duplicate_condition() {
    let source = r#"
BEGIN
COND c -> :condition --> contains = "x";
COND c -> :condition --> contains = "y";
END
"#;

    let errors = validate(source);
    let dups = for_rule(&errors, "duplicate-declaration");
    assert_eq!(dups.len(), 1);
    assert!(dups[0].message.contains("Duplicate condition name 'c'"));
}

#[test]
fn test_instruction_and_condition_may_share_name() {
    let source = r#"
BEGIN
INST same -> :rename --> path = "/x" --> mode = "lower_case";
COND same -> :condition --> contains = "y";
EXEC_COND_MAP same WITH_COND same;
END
"#;

    let errors = validate(source);
    assert!(!has_rule(&errors, "duplicate-declaration"));
    assert!(!has_errors(&parse_program(source).unwrap()));
}

// ============================================================================
// Undefined Reference Tests
// ============================================================================

#[test]
fn test_exec_undefined_instruction() {
    let errors = validate("BEGIN EXEC_INST missing; END");
    let undef = for_rule(&errors, "undefined-reference");
    assert_eq!(undef.len(), 1);
    assert_eq!(undef[0].message, "Instruction not found: missing");
}

#[test]
fn test_exec_before_declaration() {
    let source = r#"
BEGIN
EXEC_INST later;
INST later -> :rename --> path = "/x" --> mode = "lower_case";
END
"#;

    let errors = validate(source);
    assert!(has_rule(&errors, "undefined-reference"));
}

#[test]
fn test_cond_map_undefined_condition() {
    let source = r#"
BEGIN
INST a -> :rename --> path = "/x" --> mode = "lower_case";
EXEC_COND_MAP a WITH_COND nope;
END
"#;

    let errors = validate(source);
    let undef = for_rule(&errors, "undefined-reference");
    assert_eq!(undef.len(), 1);
    assert!(undef[0].message.contains("undefined condition name 'nope'"));
}

// ============================================================================
// Instruction Parameter Tests
// ============================================================================

#[test]
fn test_create_requires_name_or_namefile() {
    let source = r#"
BEGIN
INST a -> :create_file --> path = "/x";
EXEC_INST a;
END
"#;

    let errors = validate(source);
    let params = for_rule(&errors, "instruction-parameters");
    assert_eq!(params.len(), 1);
    assert!(params[0]
        .message
        .contains("Either NAME or NAMEFILE must be specified for :create_file"));
}

#[test]
fn test_create_rejects_name_and_namefile() {
    let source = r#"
BEGIN
INST a -> :create_file --> name = "a.txt" --> namefile = "names.txt" --> path = "/x";
EXEC_INST a;
END
"#;

    let program = parse_program(source).unwrap();
    let err = check_program(&program).unwrap_err();
    assert_eq!(err.rule_id, "instruction-parameters");
    assert_eq!(
        err.message,
        "Static check failed: Only one of NAME or NAMEFILE must be specified for :create_file instruction."
    );
}

#[test]
fn test_create_rejects_negative_count() {
    let source = r#"
BEGIN
INST a -> :create_folder --> name = "f_${ITERATOR}" --> path = "/x" --> count = "-5";
EXEC_INST a;
END
"#;

    let program = parse_program(source).unwrap();
    let err = check_program(&program).unwrap_err();
    assert_eq!(
        err.message,
        "Static check failed: COUNT parameter must be a positive integer for :create_folder instruction."
    );
}

#[test]
fn test_create_rejects_non_integer_count() {
    let source = r#"
BEGIN
INST a -> :create_file --> name = "f_${ITERATOR}" --> path = "/x" --> count = "many";
EXEC_INST a;
END
"#;

    let errors = validate(source);
    let params = for_rule(&errors, "instruction-parameters");
    assert_eq!(params.len(), 1);
    assert!(params[0].message.contains("must be an integer"));
}

#[test]
fn test_create_rejects_count_beyond_int_range() {
    let source = r#"
BEGIN
INST big -> :create_file --> name = "f_${ITERATOR}" --> path = "out" --> count = "3000000000";
EXEC_INST big;
END
"#;

    let program = parse_program(source).unwrap();
    let err = check_program(&program).unwrap_err();
    assert_eq!(
        err.message,
        "Static check failed: COUNT parameter must be an integer for :create_file instruction."
    );
}

#[test]
fn test_count_and_path_references_are_deferred() {
    let source = r#"
BEGIN
VAR N = "3";
VAR OUT = "/tmp/out";
INST a -> :create_file --> name = "f_${ITERATOR}" --> path = "${OUT}" --> count = "${N}";
EXEC_INST a;
END
"#;

    let errors = validate(source);
    assert!(!has_rule(&errors, "instruction-parameters"));
}

#[test]
fn test_create_requires_path() {
    let source = r#"
BEGIN
INST a -> :create_file --> name = "a.txt" --> path = "  ";
EXEC_INST a;
END
"#;

    let errors = validate(source);
    assert!(for_rule(&errors, "instruction-parameters")[0]
        .message
        .contains("Invalid PATH parameter"));
}

#[test]
fn test_group_requires_all_parameters() {
    let source = r#"
BEGIN
INST g -> :group --> path = "/out";
EXEC_INST g;
END
"#;

    let errors = validate(source);
    let messages: Vec<&str> = for_rule(&errors, "instruction-parameters")
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Static check failed: GROUP_TARGET parameter is required for :group instruction.",
            "Static check failed: MODE parameter is required for :group instruction.",
        ]
    );
}

#[test]
fn test_rename_requires_path_and_mode() {
    let errors = validate("BEGIN INST r -> :rename --> mode = \"upper_case\"; EXEC_INST r; END");
    let params = for_rule(&errors, "instruction-parameters");
    assert_eq!(params.len(), 1);
    assert!(params[0].message.contains("PATH parameter is required for :rename"));
}

#[test]
fn test_keys_are_case_insensitive() {
    let source = r#"
BEGIN
INST r -> :rename --> PATH = "/x" --> Mode = "upper_case";
EXEC_INST r;
END
"#;

    assert!(!has_rule(&validate(source), "instruction-parameters"));
}

#[test]
fn test_unsupported_action() {
    let errors = validate("BEGIN INST d -> :delete --> path = \"/x\"; EXEC_INST d; END");
    let params = for_rule(&errors, "instruction-parameters");
    assert_eq!(params.len(), 1);
    assert!(params[0].message.contains("Unknown instruction type ':delete'"));
}

// ============================================================================
// Parameter Key Tests
// ============================================================================

#[test]
fn test_parameter_keys_only_in_strict_mode() {
    let source = r#"
BEGIN
INST g -> :group --> group_target = "/in" --> path = "/out" --> mode = "copy" --> extension = "txt";
EXEC_INST g;
END
"#;

    assert!(!has_rule(&validate(source), "parameter-keys"));

    let strict = validate_strict(source);
    let keys = for_rule(&strict, "parameter-keys");
    assert_eq!(keys.len(), 1);
    assert!(keys[0].message.contains("'extension'"));
}

#[test]
fn test_parameter_keys_empty_value() {
    let strict = validate_strict(
        "BEGIN COND c -> :condition --> contains = \"\"; END",
    );
    let keys = for_rule(&strict, "parameter-keys");
    assert_eq!(keys.len(), 1);
    assert!(keys[0].message.contains("has an empty value"));
}

#[test]
fn test_strict_registers_extra_rule() {
    let ids: Vec<&str> = Validator::strict().rules().map(|(id, _)| id).collect();
    assert!(ids.contains(&"parameter-keys"));
    let ids: Vec<&str> = Validator::new().rules().map(|(id, _)| id).collect();
    assert!(!ids.contains(&"parameter-keys"));
}

// ============================================================================
// Unused Instruction Tests
// ============================================================================

#[test]
fn test_unused_instruction_is_warning() {
    let source = r#"
BEGIN
INST idle -> :rename --> path = "/x" --> mode = "lower_case";
END
"#;

    let errors = validate(source);
    let unused = for_rule(&errors, "unused-instruction");
    assert_eq!(unused.len(), 1);
    assert!(!unused[0].is_error());
    assert!(check_program(&parse_program(source).unwrap()).is_ok());
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_first_error_in_document_order() {
    let source = r#"
BEGIN
INST a -> :rename --> path = "/x";
EXEC_INST missing;
END
"#;

    let program = parse_program(source).unwrap();
    let err = check_program(&program).unwrap_err();
    assert_eq!(err.statement, 0);
    assert_eq!(err.rule_id, "instruction-parameters");

    let errors = validate_program(&program);
    let statements: Vec<usize> = errors.iter().map(|e| e.statement).collect();
    let mut sorted = statements.clone();
    sorted.sort();
    assert_eq!(statements, sorted);
}

#[test]
fn test_program_built_without_parser() {
    let program = Program::new(vec![
        Stmt::Instruction(Instruction::new(
            "r",
            Action::Rename,
            vec![Parameter::new("path", "/x"), Parameter::new("mode", "upper_case")],
        )),
        Stmt::ExecuteInstruction {
            instruction: "r".to_string(),
            span: Default::default(),
        },
    ]);

    assert!(validate_program(&program).is_empty());
}
