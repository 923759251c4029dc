//! `:group`: move or copy matching entries into one destination tree.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::filter::Filter;
use super::params::ActionGroup;
use super::{walk_entries, InstructionRunner};
use crate::executor::errors::ExecutionError;
use crate::executor::memory::Memory;
use crate::executor::types::ast::{Condition, Instruction};

/// Keys group consumes itself; everything else is a filter option.
const GROUP_KEYS: &[&str] = &["group_target", "path", "mode"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    Move,
    Copy,
}

impl GroupMode {
    /// `"copy"` copies; anything else moves.
    pub fn parse(value: &str) -> Self {
        match value {
            "copy" => GroupMode::Copy,
            "move" => GroupMode::Move,
            other => {
                debug!(mode = other, "unknown group mode, defaulting to move");
                GroupMode::Move
            }
        }
    }
}

impl InstructionRunner {
    /// Group the entries matching the filter into `path`.
    ///
    /// Candidates come from the result registry when the instruction itself
    /// or its `group_target` names an earlier result; otherwise from walking
    /// `group_target`. Entries keep their position relative to the source
    /// base. A failed move or copy is logged and the entry left out of the
    /// stored result.
    pub fn run_group(
        &self,
        memory: &mut Memory,
        instruction: &Instruction,
        condition: Option<&Condition>,
    ) -> Result<(), ExecutionError> {
        let name = instruction.name.as_str();
        let params = self.parameters(ActionGroup::Group, memory, instruction, condition)?;
        let filter =
            Filter::from_params(&params, GROUP_KEYS).map_err(|e| ExecutionError::filter(name, e))?;

        let (candidates, base) = if memory.has_result(name) {
            let previous = memory.result(name)?;
            (previous.entries.clone(), previous.base_path.clone())
        } else {
            let target = params
                .get("group_target")
                .ok_or_else(|| ExecutionError::instruction(name, "Group target not specified."))?;
            if memory.has_result(target) {
                let chained = memory.result(target)?;
                (chained.entries.clone(), chained.base_path.clone())
            } else {
                let root = self.resolve_path(target);
                if !root.is_dir() {
                    return Err(ExecutionError::instruction(
                        name,
                        "Group target must be a directory.",
                    ));
                }
                (walk_entries(&root), root)
            }
        };

        let matched = filter
            .apply(candidates)
            .map_err(|e| ExecutionError::filter(name, e))?;
        debug!(instruction = name, matched = matched.len(), "group candidates filtered");

        let output = params
            .get("path")
            .map(|raw| self.resolve_path(raw))
            .ok_or_else(|| ExecutionError::instruction(name, "Path not specified."))?;
        let mode = params
            .get("mode")
            .map(|raw| GroupMode::parse(raw))
            .ok_or_else(|| ExecutionError::instruction(name, "Mode not specified."))?;

        fs::create_dir_all(&output)
            .map_err(|err| ExecutionError::io(name, "Unable to create output directory", err))?;

        let mut grouped = Vec::with_capacity(matched.len());
        for entry in matched {
            if let Some(dest) = transfer(mode, &entry, &base, &output) {
                grouped.push(dest);
            }
        }

        memory.store_result(name, grouped, &output);
        Ok(())
    }
}

/// Destination of `entry` under `output`, keeping its path below `base`.
pub(crate) fn destination(entry: &Path, base: &Path, output: &Path) -> PathBuf {
    match entry.strip_prefix(base) {
        Ok(relative) if !relative.as_os_str().is_empty() => output.join(relative),
        _ => output.join(entry.file_name().unwrap_or(entry.as_os_str())),
    }
}

/// Move or copy one entry. `None` when it was skipped.
fn transfer(mode: GroupMode, entry: &Path, base: &Path, output: &Path) -> Option<PathBuf> {
    if fs::metadata(entry).is_err() {
        warn!(path = %entry.display(), "could not find entry, skipping");
        return None;
    }

    let dest = destination(entry, base, output);
    if dest == entry {
        debug!(path = %entry.display(), "entry already in place");
        return Some(dest);
    }
    if let Some(parent) = dest.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = %parent.display(), error = %err, "unable to create destination directory");
            return None;
        }
    }

    let outcome = match mode {
        GroupMode::Move => move_entry(entry, &dest),
        GroupMode::Copy => copy_entry(entry, &dest),
    };

    match outcome {
        Ok(()) => {
            info!(from = %entry.display(), to = %dest.display(), ?mode, "grouped entry");
            Some(dest)
        }
        Err(err) => {
            warn!(path = %entry.display(), error = %err, ?mode, "unable to group entry");
            None
        }
    }
}

fn move_entry(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // rename cannot cross filesystems; fall back for plain files
        Err(_) if from.is_file() => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

fn copy_entry(from: &Path, to: &Path) -> std::io::Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)
    } else {
        fs::copy(from, to).map(|_| ())
    }
}
