//! `:create_file` and `:create_folder`.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use super::naming::generate_names;
use super::params::{ActionGroup, ParamMap};
use super::InstructionRunner;
use crate::executor::errors::ExecutionError;
use crate::executor::memory::Memory;
use crate::executor::types::ast::{Condition, Instruction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationKind {
    File,
    Folder,
}

impl InstructionRunner {
    /// Create the named files or folders and record them under the
    /// instruction's name.
    ///
    /// An entry that already exists is logged and left out of the result.
    /// Any other failure stops the loop and nothing is recorded.
    pub fn run_create(
        &self,
        memory: &mut Memory,
        instruction: &Instruction,
        kind: CreationKind,
        condition: Option<&Condition>,
    ) -> Result<(), ExecutionError> {
        let name = instruction.name.as_str();
        let params = self.parameters(ActionGroup::Create, memory, instruction, condition)?;

        let names = self.creation_names(name, &params)?;

        let output = match params.get("path") {
            Some(path) => self.resolve_path(path),
            None => {
                debug!(instruction = name, "no path given, creating in working directory");
                self.working_dir().to_path_buf()
            }
        };

        if kind == CreationKind::Folder {
            if let Some(bad) = names.iter().find(|n| n.contains('.')) {
                return Err(ExecutionError::instruction(
                    name,
                    format!("Found restricted symbol in specified folder name: {bad}"),
                ));
            }
        }

        let template = match (kind, params.get("template_path")) {
            (CreationKind::File, Some(raw)) => Some(self.resolve_path(raw)),
            _ => None,
        };

        fs::create_dir_all(&output)
            .map_err(|err| ExecutionError::io(name, "File path does not exist", err))?;

        let mut created = Vec::with_capacity(names.len());
        for entry_name in &names {
            let target = output.join(entry_name);
            let made = match kind {
                CreationKind::File => create_file(name, &target, template.as_deref())?,
                CreationKind::Folder => create_folder(name, &target)?,
            };
            if made {
                created.push(target);
            }
        }

        memory.store_result(name, created, &output);
        Ok(())
    }

    /// Names to create, from `namefile` lines or the `name` template.
    fn creation_names(&self, instruction: &str, params: &ParamMap) -> Result<Vec<String>, ExecutionError> {
        if let Some(raw) = params.get("namefile") {
            let path = self.resolve_path(raw);
            let contents = fs::read_to_string(&path).map_err(|err| {
                ExecutionError::io(
                    instruction,
                    format!("Unable to read name file {}", path.display()),
                    err,
                )
            })?;
            let names: Vec<String> = contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            if params.contains_key("count") {
                debug!(instruction, "count ignored when namefile is given");
            }
            if names.is_empty() {
                return Err(ExecutionError::instruction(
                    instruction,
                    format!("Name file {} contains no names", path.display()),
                ));
            }
            return Ok(names);
        }

        let template = params.get("name").ok_or_else(|| {
            ExecutionError::instruction(instruction, "Name parameter is missing")
        })?;

        let count = match params.get("count") {
            Some(raw) => {
                let count: i32 = raw.trim().parse().map_err(|_| {
                    ExecutionError::instruction(instruction, format!("Invalid format for Count: {raw}."))
                })?;
                if count < 1 {
                    return Err(ExecutionError::instruction(
                        instruction,
                        format!("Count can not be less than 1: {raw}."),
                    ));
                }
                usize::try_from(count).map_err(|_| {
                    ExecutionError::instruction(instruction, format!("Invalid format for Count: {raw}."))
                })?
            }
            None => 1,
        };

        generate_names(template, count).map_err(|source| ExecutionError::Naming {
            instruction: instruction.to_string(),
            source,
        })
    }
}

/// Returns `Ok(false)` when the file already exists.
fn create_file(instruction: &str, target: &Path, template: Option<&Path>) -> Result<bool, ExecutionError> {
    if let Some(template) = template {
        if target.exists() {
            warn!(path = %target.display(), "file already exists, not created");
            return Ok(false);
        }
        fs::copy(template, target).map_err(|err| {
            ExecutionError::io(
                instruction,
                format!("Failed to copy template {} on {} file creation", template.display(), file_label(target)),
                err,
            )
        })?;
        info!(path = %target.display(), template = %template.display(), "file created from template");
        return Ok(true);
    }

    match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(_) => {
            info!(path = %target.display(), "file created");
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            warn!(path = %target.display(), "file already exists, not created");
            Ok(false)
        }
        Err(err) => Err(ExecutionError::io(
            instruction,
            format!("Failed on {} file creation", file_label(target)),
            err,
        )),
    }
}

/// Returns `Ok(false)` when the folder already exists.
fn create_folder(instruction: &str, target: &Path) -> Result<bool, ExecutionError> {
    if target.exists() {
        warn!(path = %target.display(), "folder already exists, not created");
        return Ok(false);
    }
    fs::create_dir_all(target).map_err(|err| {
        ExecutionError::io(
            instruction,
            format!("Failed on {} folder creation", file_label(target)),
            err,
        )
    })?;
    info!(path = %target.display(), "folder created");
    Ok(true)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
