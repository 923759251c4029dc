pub mod ast;

pub use ast::{
    is_variable_reference, Action, Condition, Instruction, Parameter, Program, Span, Stmt,
};
