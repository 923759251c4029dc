//! Executor tests
//!
//! Runner tests drive one operation against a temp directory; evaluator
//! tests run whole programs through the parser and checker.

mod helpers;

mod evaluator_tests;
