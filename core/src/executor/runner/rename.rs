//! `:rename`: change the case of matching entries in place.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::filter::{EntryKind, Filter};
use super::params::ActionGroup;
use super::{walk_entries, InstructionRunner};
use crate::executor::errors::ExecutionError;
use crate::executor::memory::Memory;
use crate::executor::types::ast::{Condition, Instruction};

/// Keys rename consumes itself; everything else is a filter option.
const RENAME_KEYS: &[&str] = &["mode", "path", "recursive"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Upper,
    Lower,
}

impl CaseMode {
    /// `"upper_case"` or `"lower_case"`; anything else is lower case.
    pub fn parse(value: &str) -> Self {
        match value {
            "upper_case" => CaseMode::Upper,
            "lower_case" => CaseMode::Lower,
            other => {
                debug!(mode = other, "unknown rename mode, defaulting to lower_case");
                CaseMode::Lower
            }
        }
    }

    fn apply(self, text: &str) -> String {
        match self {
            CaseMode::Upper => text.to_uppercase(),
            CaseMode::Lower => text.to_lowercase(),
        }
    }
}

/// Split a file name into stem and `.extension`. The extension is kept
/// only when something follows the last dot.
pub(crate) fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name.split_at(idx),
        _ => (name, ""),
    }
}

/// New name for `name` under `mode`, extension untouched.
pub fn renamed(name: &str, mode: CaseMode) -> String {
    let (stem, extension) = split_extension(name);
    format!("{}{}", mode.apply(stem), extension)
}

impl InstructionRunner {
    /// Rename matching entries under `path`.
    ///
    /// The first failed rename aborts the operation. Entries renamed before
    /// it stay renamed.
    pub fn run_rename(
        &self,
        memory: &mut Memory,
        instruction: &Instruction,
        condition: Option<&Condition>,
    ) -> Result<(), ExecutionError> {
        let name = instruction.name.as_str();
        let params = self.parameters(ActionGroup::Rename, memory, instruction, condition)?;

        let (Some(raw_path), Some(raw_mode)) = (params.get("path"), params.get("mode")) else {
            return Err(ExecutionError::instruction(name, "Unknown targetPath or mode."));
        };

        let filter =
            Filter::from_params(&params, RENAME_KEYS).map_err(|e| ExecutionError::filter(name, e))?;

        let chained = memory.has_result(raw_path);
        let target = if chained {
            memory.result(raw_path)?.base_path.clone()
        } else {
            self.resolve_path(raw_path)
        };

        if !target.exists() {
            return Err(ExecutionError::instruction(
                name,
                "Are you sure the specified path exists?",
            ));
        }
        if !target.is_dir() {
            return Err(ExecutionError::instruction(name, "Path must be a valid folder!"));
        }

        let mode = CaseMode::parse(raw_mode);
        let recursive = params
            .get("recursive")
            .map_or(true, |value| value.trim().eq_ignore_ascii_case("true"));

        let candidates: Vec<PathBuf> = if recursive {
            let kind = params.get("type").and_then(|t| EntryKind::parse(t));
            walk_entries(&target)
                .into_iter()
                .filter(|path| kind.map_or(true, |kind| kind.admits(path)))
                .collect()
        } else if chained {
            memory.result(raw_path)?.entries.clone()
        } else {
            direct_children(name, &target)?
        };

        let mut matched = filter
            .apply(candidates)
            .map_err(|e| ExecutionError::filter(name, e))?;
        debug!(instruction = name, matched = matched.len(), recursive, "rename candidates filtered");

        // children before their parents so walked paths stay valid
        matched.sort_by_key(|path| Reverse(path.components().count()));

        for old in matched {
            let Some(file_name) = old.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let new = old.with_file_name(renamed(&file_name, mode));
            if new == old {
                continue;
            }
            fs::rename(&old, &new).map_err(|source| ExecutionError::RenameFailed {
                path: old.clone(),
                source,
            })?;
            info!(from = %old.display(), to = %new.display(), "renamed entry");
        }

        Ok(())
    }
}

fn direct_children(instruction: &str, dir: &Path) -> Result<Vec<PathBuf>, ExecutionError> {
    let entries = fs::read_dir(dir)
        .map_err(|err| ExecutionError::io(instruction, "Unable to list folder", err))?;
    let mut children = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ExecutionError::io(instruction, "Unable to list folder", err))?;
    children.sort();
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("apple.txt"), ("apple", ".txt"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension("trailing."), ("trailing.", ""));
        assert_eq!(split_extension(".bashrc"), ("", ".bashrc"));
    }

    #[test]
    fn test_renamed_keeps_extension() {
        assert_eq!(renamed("apple.TXT", CaseMode::Upper), "APPLE.TXT");
        assert_eq!(renamed("Orange.Txt", CaseMode::Lower), "orange.Txt");
        assert_eq!(renamed("Folder", CaseMode::Upper), "FOLDER");
    }

    #[test]
    fn test_unknown_mode_is_lower_case() {
        assert_eq!(CaseMode::parse("title_case"), CaseMode::Lower);
        assert_eq!(CaseMode::parse("upper_case"), CaseMode::Upper);
    }
}
