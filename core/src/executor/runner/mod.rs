//! Instruction runner: the four file operations.
//!
//! Each operation merges the instruction's parameters with an optional
//! condition, resolves them against [`Memory`], and then touches the
//! filesystem. Relative paths are resolved against the runner's working
//! directory; the process working directory is never changed.

pub mod create;
pub mod filter;
pub mod group;
pub mod naming;
pub mod params;
pub mod rename;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::errors::ExecutionError;
use super::memory::Memory;
use super::types::ast::{Action, Condition, Instruction};

pub use create::CreationKind;
pub use filter::Filter;
pub use naming::generate_names;
pub use params::{ActionGroup, IgnoreList, ParamMap};

/// Executes instructions against the filesystem.
#[derive(Debug, Clone)]
pub struct InstructionRunner {
    ignore_list: IgnoreList,
    working_dir: PathBuf,
}

impl InstructionRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            ignore_list: IgnoreList::default(),
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run `instruction`, merged with `condition` if given.
    pub fn run(
        &self,
        memory: &mut Memory,
        instruction: &Instruction,
        condition: Option<&Condition>,
    ) -> Result<(), ExecutionError> {
        match &instruction.action {
            Action::CreateFile => self.run_create(memory, instruction, CreationKind::File, condition),
            Action::CreateFolder => {
                self.run_create(memory, instruction, CreationKind::Folder, condition)
            }
            Action::Group => self.run_group(memory, instruction, condition),
            Action::Rename => self.run_rename(memory, instruction, condition),
            Action::Unsupported(keyword) => Err(ExecutionError::instruction(
                &instruction.name,
                format!("Unsupported action :{keyword}"),
            )),
        }
    }

    /// Effective parameters for one execution.
    pub(crate) fn parameters(
        &self,
        group: ActionGroup,
        memory: &Memory,
        instruction: &Instruction,
        condition: Option<&Condition>,
    ) -> Result<ParamMap, ExecutionError> {
        let params = self.ignore_list.merge(
            group,
            &instruction.params,
            condition.map(|c| c.params.as_slice()),
            memory,
        )?;
        debug!(
            instruction = %instruction.name,
            condition = condition.map(|c| c.name.as_str()),
            ?params,
            "merged parameters"
        );
        Ok(params)
    }

    /// Join a relative path onto the working directory.
    pub(crate) fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// Every entry below `root`, parents before children, siblings by name.
/// Unreadable entries are logged and skipped.
pub(crate) fn walk_entries(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                None
            }
        })
        .collect()
}

impl Default for InstructionRunner {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
