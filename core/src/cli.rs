use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::executor::RunReport;
use crate::interpreter::{Interpreter, InterpreterError};

#[derive(Parser)]
#[command(name = "simplefiles")]
#[command(about = "SimpleFiles - a small language for organizing files", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse, check and execute a program
    Run {
        /// Program file
        file: PathBuf,

        /// Base directory for relative paths (overrides config)
        #[arg(long = "working-dir")]
        working_dir: Option<PathBuf>,

        /// Enforce the parameter key allow-list
        #[arg(long)]
        strict: bool,
    },

    /// Parse and check a program without executing it
    Check {
        /// Program file
        file: PathBuf,

        /// Enforce the parameter key allow-list
        #[arg(long)]
        strict: bool,
    },

    /// Print the parsed program as JSON
    Ast {
        /// Program file
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Build the effective configuration, with CLI flags applied last.
    pub fn load_config(&self) -> Result<Config> {
        let (working_dir, strict) = match &self.command {
            Commands::Run {
                working_dir,
                strict,
                ..
            } => (working_dir.clone(), strict.then_some(true)),
            Commands::Check { strict, .. } => (None, strict.then_some(true)),
            _ => (None, None),
        };

        Config::builder()
            .config_path(self.config.clone())
            .working_dir(working_dir)
            .strict_parameter_keys(strict)
            .build()
    }
}

/// What the command means for the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Run a parsed command line against an already-loaded config.
pub fn run_cli_with_args(cli: &Cli, config: &Config) -> Result<Outcome> {
    match &cli.command {
        Commands::Run { file, .. } => {
            let source = read_program(file)?;
            let interpreter = Interpreter::from_config(config);

            let report = match interpreter.run_source(&source) {
                Ok(report) => report,
                Err(InterpreterError::Aborted(aborted)) => {
                    print_report(&aborted.report);
                    eprintln!("Error: statement {} aborted the run: {}", aborted.statement, aborted.source);
                    return Ok(Outcome::Failure);
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    return Ok(Outcome::Failure);
                }
            };

            print_report(&report);

            Ok(if report.has_failures() {
                Outcome::Failure
            } else {
                Outcome::Success
            })
        }

        Commands::Check { file, .. } => {
            let source = read_program(file)?;
            let interpreter = Interpreter::from_config(config);

            let program = match interpreter.parse(&source) {
                Ok(program) => program,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    return Ok(Outcome::Failure);
                }
            };

            let findings = interpreter.findings(&program);
            for finding in &findings {
                println!("{}", finding);
            }

            if findings.iter().any(|f| f.is_error()) {
                Ok(Outcome::Failure)
            } else {
                println!("✓ {} is valid", file.display());
                Ok(Outcome::Success)
            }
        }

        Commands::Ast { file } => {
            let source = read_program(file)?;
            let program = match crate::parser::parse_program(&source) {
                Ok(program) => program,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    return Ok(Outcome::Failure);
                }
            };
            let json = serde_json::to_string_pretty(&program)
                .context("Failed to serialize program")?;
            println!("{}", json);
            Ok(Outcome::Success)
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(Outcome::Success)
        }
    }
}

fn print_report(report: &RunReport) {
    for statement in &report.statements {
        println!("[{}] {}: {}", statement.index, statement.label, statement.outcome);
    }
    println!(
        "\n{} of {} statement(s) completed",
        report.completed(),
        report.statements.len()
    );
}

fn read_program(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "simplefiles",
            "run",
            "prog.sf",
            "--working-dir",
            "/data",
            "--strict",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                file,
                working_dir,
                strict,
            } => {
                assert_eq!(file, PathBuf::from("prog.sf"));
                assert_eq!(working_dir, Some(PathBuf::from("/data")));
                assert!(strict);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["simplefiles", "check", "prog.sf", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_run_reports_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = dir.path().join("prog.sf");
        fs::write(
            &program,
            r#"BEGIN
            INST r -> :rename --> path = "missing" --> mode = "upper_case";
            EXEC_INST r;
            END"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from(["simplefiles", "run", program.to_str().unwrap()]).unwrap();
        let config = Config {
            working_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        assert_eq!(run_cli_with_args(&cli, &config).unwrap(), Outcome::Failure);
    }

    #[test]
    fn test_check_valid_program() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = dir.path().join("prog.sf");
        fs::write(
            &program,
            r#"BEGIN
            INST c -> :create_file --> name = "a.txt" --> path = "out";
            EXEC_INST c;
            END"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from(["simplefiles", "check", program.to_str().unwrap()]).unwrap();
        let config = Config {
            working_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        assert_eq!(run_cli_with_args(&cli, &config).unwrap(), Outcome::Success);
        assert!(!dir.path().join("out").exists());
    }
}
