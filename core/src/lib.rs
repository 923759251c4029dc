pub mod cli;
pub mod config;
pub mod executor;
pub mod interpreter;
pub mod parser;

// Re-export main types
pub use config::Config;
pub use executor::types::*;
pub use interpreter::{Interpreter, InterpreterError};
