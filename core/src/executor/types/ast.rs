//! Abstract Syntax Tree node types

use serde::{Deserialize, Serialize};

/// Source location span for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Start line (0-indexed)
    pub start_line: usize,
    /// Start column (0-indexed)
    pub start_col: usize,
    /// End line (0-indexed)
    pub end_line: usize,
    /// End column (0-indexed)
    pub end_col: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span that covers both self and other
    pub fn merge(&self, other: &Span) -> Span {
        let (start_line, start_col) = if self.start <= other.start {
            (self.start_line, self.start_col)
        } else {
            (other.start_line, other.start_col)
        };
        let (end_line, end_col) = if self.end >= other.end {
            (self.end_line, self.end_col)
        } else {
            (other.end_line, other.end_col)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

pub(crate) fn is_default_span(span: &Span) -> bool {
    *span == Span::default()
}

/// The operation an instruction performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateFile,
    CreateFolder,
    Group,
    Rename,
    /// An action keyword the interpreter does not support. Kept in the tree
    /// so the static checker can report it.
    Unsupported(String),
}

impl Action {
    /// Map an action keyword (`:create_file`, `create_file`, ...) to an action.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().trim_start_matches(':') {
            "create_file" => Action::CreateFile,
            "create_folder" => Action::CreateFolder,
            "group" => Action::Group,
            "rename" => Action::Rename,
            other => Action::Unsupported(other.to_string()),
        }
    }

    /// Keyword form used in diagnostics, e.g. `:create_file`.
    pub fn keyword(&self) -> String {
        match self {
            Action::CreateFile => ":create_file".to_string(),
            Action::CreateFolder => ":create_folder".to_string(),
            Action::Group => ":group".to_string(),
            Action::Rename => ":rename".to_string(),
            Action::Unsupported(other) => format!(":{}", other),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.keyword())
    }
}

/// A `key = "value"` pair attached to an instruction or condition.
///
/// `value` is stored raw. A value of the form `${NAME}` is a variable
/// reference and is looked up in memory every time it is read, never when
/// it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            span: Span::default(),
        }
    }

    /// True when the raw value is a `${...}` variable reference.
    pub fn is_reference(&self) -> bool {
        is_variable_reference(&self.value)
    }
}

/// Whether `value` is syntactically a variable reference: `${` ... `}`
/// spanning the whole string.
pub fn is_variable_reference(value: &str) -> bool {
    value.len() >= 3 && value.starts_with("${") && value.ends_with('}')
}

/// A named, reusable file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub name: String,
    pub action: Action,
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl Instruction {
    pub fn new(name: impl Into<String>, action: Action, params: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            action,
            params,
            span: Span::default(),
        }
    }
}

/// A named parameter set merged into an instruction at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl Condition {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            params,
            span: Span::default(),
        }
    }
}

/// Statement AST node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Stmt {
    Instruction(Instruction),
    Condition(Condition),
    ExecuteInstruction {
        instruction: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    ExecuteCondMap {
        instruction: String,
        condition: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Variable {
        key: String,
        value: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Instruction(inst) => inst.span,
            Stmt::Condition(cond) => cond.span,
            Stmt::ExecuteInstruction { span, .. }
            | Stmt::ExecuteCondMap { span, .. }
            | Stmt::Variable { span, .. } => *span,
        }
    }

    /// Short human-readable label, used in run reports.
    pub fn describe(&self) -> String {
        match self {
            Stmt::Instruction(inst) => format!("INST {}", inst.name),
            Stmt::Condition(cond) => format!("COND {}", cond.name),
            Stmt::ExecuteInstruction { instruction, .. } => format!("EXEC_INST {}", instruction),
            Stmt::ExecuteCondMap {
                instruction,
                condition,
                ..
            } => format!("EXEC_COND_MAP {} WITH_COND {}", instruction, condition),
            Stmt::Variable { key, .. } => format!("VAR {}", key),
        }
    }
}

/// A parsed program: statements in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self {
            statements,
            span: Span::default(),
        }
    }
}
