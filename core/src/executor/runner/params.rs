//! Parameter merging.
//!
//! An instruction's own parameters form the base map. A condition's
//! parameters overlay it, except for keys on the action's ignore-list.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::executor::errors::MemoryError;
use crate::executor::memory::Memory;
use crate::executor::types::ast::{Action, Parameter};

/// Effective key/value map for one execution, values already resolved.
pub type ParamMap = HashMap<String, String>;

/// Which ignore-list applies. Both create actions share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionGroup {
    Create,
    Group,
    Rename,
}

impl ActionGroup {
    pub fn of(action: &Action) -> Option<Self> {
        match action {
            Action::CreateFile | Action::CreateFolder => Some(ActionGroup::Create),
            Action::Group => Some(ActionGroup::Group),
            Action::Rename => Some(ActionGroup::Rename),
            Action::Unsupported(_) => None,
        }
    }
}

/// Condition keys that may not override an instruction, per action group.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    ignored: HashMap<ActionGroup, HashSet<&'static str>>,
}

impl Default for IgnoreList {
    fn default() -> Self {
        let mut ignored = HashMap::new();
        ignored.insert(
            ActionGroup::Create,
            HashSet::from([
                "extension",
                "group_target",
                "mode",
                "type",
                "contains",
                "regex",
                "modified_date",
                "size",
            ]),
        );
        ignored.insert(
            ActionGroup::Group,
            HashSet::from([
                "template_path",
                "name",
                "namefile",
                "name_file",
                "count",
            ]),
        );
        ignored.insert(
            ActionGroup::Rename,
            HashSet::from([
                "template_path",
                "name",
                "namefile",
                "name_file",
                "count",
                "group_target",
            ]),
        );
        Self { ignored }
    }
}

impl IgnoreList {
    pub fn should_ignore(&self, group: ActionGroup, key: &str) -> bool {
        self.ignored
            .get(&group)
            .is_some_and(|keys| keys.contains(key))
    }

    /// Build the effective parameter map for an execution. Keys are
    /// lowercased.
    ///
    /// Every value is resolved against `memory` here, so the map reflects the
    /// environment as it is at the moment the instruction runs.
    pub fn merge(
        &self,
        group: ActionGroup,
        instruction: &[Parameter],
        condition: Option<&[Parameter]>,
        memory: &Memory,
    ) -> Result<ParamMap, MemoryError> {
        let mut map = ParamMap::new();
        for param in instruction {
            map.insert(param.key.to_lowercase(), memory.resolve_parameter(param)?);
        }

        for param in condition.unwrap_or_default() {
            let key = param.key.to_lowercase();
            if self.should_ignore(group, &key) {
                debug!(%key, ?group, "condition parameter ignored");
                continue;
            }
            map.insert(key, memory.resolve_parameter(param)?);
        }

        Ok(map)
    }
}
