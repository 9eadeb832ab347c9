//! Structural policies applied by [`TreeArena`](crate::domain::TreeArena) mutations.

use serde::{Deserialize, Serialize};

/// How `add` treats a child that is an ancestor of the target branch.
///
/// Adding a branch to itself is rejected under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Walk the parent chain of the target branch before linking.
    #[default]
    Reject,
    /// Skip the ancestor walk; acyclicity is the caller's obligation.
    ///
    /// Adding a detached root below one of its own descendants links a
    /// cycle. Traversals over it only end through `max_depth` or a cancel
    /// flag, and `prune` refuses its nodes since each has a parent.
    Unchecked,
}

/// How `remove` treats a child that is not present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovePolicy {
    /// Absent child is a no-op.
    #[default]
    Ignore,
    /// Absent child fails with `ChildNotFound`.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreePolicy {
    #[serde(rename = "cycle_policy")]
    pub cycle: CyclePolicy,
    #[serde(rename = "remove_policy")]
    pub remove: RemovePolicy,
}

impl TreePolicy {
    pub fn strict() -> Self {
        Self {
            cycle: CyclePolicy::Reject,
            remove: RemovePolicy::Strict,
        }
    }
}
