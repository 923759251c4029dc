//! PEST-based parser for SimpleFiles programs
//!
//! Produces the AST in `executor::types::ast`, with span information for
//! error reporting.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use super::executor::types::ast::{Action, Condition, Instruction, Parameter, Program, Span, Stmt};

pub mod semantic_validator;


/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/simplefiles.pest"]
struct SimpleFilesParser;

/* ===================== Error Types ===================== */

#[derive(Debug)]
pub enum ParseError {
    PestError(String, Option<Span>),
    BuildError(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::PestError(_, span) => *span,
            ParseError::BuildError(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::PestError(msg, _) => msg,
            ParseError::BuildError(msg, _) => msg,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::PestError(msg, _) => write!(f, "{}", msg),
            ParseError::BuildError(msg, _) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let span = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => Some(Span {
                start: 0,
                end: 0,
                start_line: line.saturating_sub(1),
                start_col: col.saturating_sub(1),
                end_line: line.saturating_sub(1),
                end_col: col,
            }),
            pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
                Some(Span {
                    start: 0,
                    end: 0,
                    start_line: start_line.saturating_sub(1),
                    start_col: start_col.saturating_sub(1),
                    end_line: end_line.saturating_sub(1),
                    end_col: end_col.saturating_sub(1),
                })
            }
        };
        ParseError::PestError(err.to_string(), span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Span Helpers ===================== */

/// Convert a PEST pair's span to our Span type
fn pair_to_span(pair: &Pair<Rule>, source: &str) -> Span {
    let pest_span = pair.as_span();
    let start = pest_span.start();
    let end = pest_span.end();

    let (start_line, start_col) = offset_to_line_col(source, start);
    let (end_line, end_col) = offset_to_line_col(source, end);

    Span::new(start, end, start_line, start_col, end_line, end_col)
}

/// Convert byte offset to (line, column) - 0-indexed
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/* ===================== Public API ===================== */

/// Parse a SimpleFiles source string into a program
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let mut pairs = SimpleFilesParser::parse(Rule::program, source)?;

    let program = pairs
        .next()
        .ok_or_else(|| ParseError::BuildError("Empty parse result".to_string(), None))?;
    let span = pair_to_span(&program, source);

    let statements = program
        .into_inner()
        .filter(|pair| !is_keyword(pair.as_rule()) && pair.as_rule() != Rule::EOI)
        .map(|pair| build_statement(pair, source))
        .collect::<ParseResult<Vec<Stmt>>>()?;

    Ok(Program { statements, span })
}

/* ===================== AST Builder ===================== */

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_begin
            | Rule::kw_end
            | Rule::kw_inst
            | Rule::kw_cond
            | Rule::kw_var
            | Rule::kw_exec_inst
            | Rule::kw_exec_cond_map
            | Rule::kw_with_cond
    )
}

/// Next non-keyword child of a rule, or a build error naming what was expected.
fn next_inner<'a>(
    inner: &mut Pairs<'a, Rule>,
    expected: &str,
    span: Span,
) -> ParseResult<Pair<'a, Rule>> {
    inner
        .find(|pair| !is_keyword(pair.as_rule()))
        .ok_or_else(|| ParseError::BuildError(format!("Expected {}", expected), Some(span)))
}

fn build_statement(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    match pair.as_rule() {
        Rule::instruction => build_instruction(pair, source),
        Rule::condition => build_condition(pair, source),
        Rule::variable => build_variable(pair, source),
        Rule::exec_inst => build_exec_inst(pair, source),
        Rule::exec_cond_map => build_exec_cond_map(pair, source),
        _ => Err(ParseError::BuildError(
            format!("Unexpected statement rule: {:?}", pair.as_rule()),
            Some(pair_to_span(&pair, source)),
        )),
    }
}

fn build_instruction(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let name = next_inner(&mut inner, "instruction name", span)?
        .as_str()
        .to_string();
    let action_pair = next_inner(&mut inner, "action", span)?;
    let action = Action::from_keyword(action_pair.as_str());
    let params = build_parameters(inner, source)?;

    Ok(Stmt::Instruction(Instruction {
        name,
        action,
        params,
        span,
    }))
}

fn build_condition(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let name = next_inner(&mut inner, "condition name", span)?
        .as_str()
        .to_string();
    let action_pair = next_inner(&mut inner, "action", span)?;
    if action_pair.as_str() != ":condition" {
        return Err(ParseError::BuildError(
            format!(
                "Condition {} must declare :condition, got: {}",
                name,
                action_pair.as_str()
            ),
            Some(pair_to_span(&action_pair, source)),
        ));
    }
    let params = build_parameters(inner, source)?;

    Ok(Stmt::Condition(Condition { name, params, span }))
}

fn build_parameters(inner: Pairs<Rule>, source: &str) -> ParseResult<Vec<Parameter>> {
    inner
        .filter(|pair| pair.as_rule() == Rule::parameter)
        .map(|pair| build_parameter(pair, source))
        .collect()
}

fn build_parameter(pair: Pair<Rule>, source: &str) -> ParseResult<Parameter> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let key = next_inner(&mut inner, "parameter key", span)?
        .as_str()
        .to_string();
    let value = string_value(next_inner(&mut inner, "parameter value", span)?);

    Ok(Parameter { key, value, span })
}

fn build_variable(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let key = next_inner(&mut inner, "variable name", span)?
        .as_str()
        .to_string();
    let value = string_value(next_inner(&mut inner, "variable value", span)?);

    Ok(Stmt::Variable { key, value, span })
}

fn build_exec_inst(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let instruction = next_inner(&mut inner, "instruction name", span)?
        .as_str()
        .to_string();

    Ok(Stmt::ExecuteInstruction { instruction, span })
}

fn build_exec_cond_map(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let instruction = next_inner(&mut inner, "instruction name", span)?
        .as_str()
        .to_string();
    let condition = next_inner(&mut inner, "condition name", span)?
        .as_str()
        .to_string();

    Ok(Stmt::ExecuteCondMap {
        instruction,
        condition,
        span,
    })
}

/// Contents of a quoted string, taken verbatim.
fn string_value(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|content| content.as_str().to_string())
        .unwrap_or_default()
}
