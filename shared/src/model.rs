use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

use crate::cache::QueryCache;
use crate::config::ReviewConfig;
use crate::error::PayloadError;

/// Explicit timestamp unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub fn now() -> Self {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(ms)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProblemStatement {
    pub problem_statement: String,
}

impl ProblemStatement {
    pub fn from_payload(payload: Value) -> Result<Self, PayloadError> {
        let statement: Self =
            serde_json::from_value(payload).map_err(|e| PayloadError::Invalid {
                target: "problem_statement",
                reason: e.to_string(),
            })?;
        if statement.problem_statement.trim().is_empty() {
            return Err(PayloadError::Empty {
                target: "problem_statement",
            });
        }
        Ok(statement)
    }
}

/// A generated solution. Fields default to empty so a solution that is still
/// streaming in can be cached and rendered piecemeal.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Solution {
    pub code: String,
    pub thoughts: Vec<String>,
    pub time_complexity: String,
    pub space_complexity: String,
}

impl Solution {
    /// Absent payloads and payloads with no usable field are rejected.
    pub fn from_payload(payload: Option<Value>) -> Result<Self, PayloadError> {
        let payload = match payload {
            None | Some(Value::Null) => return Err(PayloadError::Missing),
            Some(value) => value,
        };
        if !payload.is_object() {
            return Err(PayloadError::Invalid {
                target: "solution",
                reason: "expected an object".to_string(),
            });
        }
        let solution: Self =
            serde_json::from_value(payload).map_err(|e| PayloadError::Invalid {
                target: "solution",
                reason: e.to_string(),
            })?;
        if solution.is_empty() {
            return Err(PayloadError::Empty { target: "solution" });
        }
        Ok(solution)
    }

    #[must_use]
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }

    #[must_use]
    pub fn has_thoughts(&self) -> bool {
        self.thoughts.iter().any(|t| !t.trim().is_empty())
    }

    #[must_use]
    pub fn has_complexity(&self) -> bool {
        !self.time_complexity.trim().is_empty() || !self.space_complexity.trim().is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_code() && !self.has_thoughts() && !self.has_complexity()
    }
}

/// Entry as reported by the platform bridge.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ScreenshotEntry {
    pub path: String,
    pub preview: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ScreenshotRef {
    /// The path doubles as the stable identity.
    pub id: String,
    pub path: String,
    pub preview: String,
    pub timestamp: UnixTimeMs,
}

impl ScreenshotRef {
    #[must_use]
    pub fn from_entry(entry: ScreenshotEntry, timestamp: UnixTimeMs) -> Self {
        Self {
            id: entry.path.clone(),
            path: entry.path,
            preview: entry.preview,
            timestamp,
        }
    }
}

/// Bounded, insertion-ordered screenshot list. Oldest entries sit at the
/// front and are the first to go. `revision` moves on every mutation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenshotList {
    items: VecDeque<ScreenshotRef>,
    #[serde(skip)]
    revision: u64,
}

impl ScreenshotList {
    /// Replace the whole list with the authoritative one, keeping the last
    /// `limit` entries.
    pub fn replace(&mut self, entries: Vec<ScreenshotEntry>, limit: usize, now: UnixTimeMs) {
        let skip = entries.len().saturating_sub(limit);
        self.items = entries
            .into_iter()
            .skip(skip)
            .map(|e| ScreenshotRef::from_entry(e, now))
            .collect();
        self.revision += 1;
    }

    pub fn truncate_front(&mut self, limit: usize) {
        if self.items.len() <= limit {
            return;
        }
        let excess = self.items.len() - limit;
        self.items.drain(..excess);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.revision += 1;
        }
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn path_at(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|s| s.path.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScreenshotRef> {
        self.items.iter()
    }
}

/// Activation state. `epoch` increases on every mount and tags async
/// completions so that anything resolving after teardown can be dropped.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountState {
    pub active: bool,
    pub epoch: u64,
}

impl MountState {
    #[must_use]
    pub fn accepts(&self, epoch: u64) -> bool {
        self.active && self.epoch == epoch
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub cache: QueryCache,
    pub screenshots: ScreenshotList,
    pub is_resetting: bool,
    /// Bumped on each reset; a deferred revert only applies to the generation
    /// it captured.
    pub reset_generation: u64,
    pub is_debug_processing: bool,
    pub mount: MountState,
    pub config: ReviewConfig,
}

impl Model {
    #[must_use]
    pub fn solution(&self) -> Option<Solution> {
        self.cache.solution()
    }

    #[must_use]
    pub fn debug_solution(&self) -> Option<Solution> {
        self.cache.new_solution()
    }

    #[must_use]
    pub fn problem_statement(&self) -> Option<ProblemStatement> {
        self.cache.problem_statement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(n: usize) -> Vec<ScreenshotEntry> {
        (0..n)
            .map(|i| ScreenshotEntry {
                path: format!("/tmp/shot-{i}.png"),
                preview: format!("data:image/png;base64,{i}"),
            })
            .collect()
    }

    #[test]
    fn replace_keeps_most_recent() {
        let mut list = ScreenshotList::default();
        list.replace(entries(103), 100, UnixTimeMs(7));
        assert_eq!(list.len(), 100);
        assert_eq!(list.path_at(0), Some("/tmp/shot-3.png"));
        assert_eq!(list.path_at(99), Some("/tmp/shot-102.png"));
        assert!(list.iter().all(|s| s.timestamp == UnixTimeMs(7) && s.id == s.path));
    }

    #[test]
    fn revision_moves_only_on_change() {
        let mut list = ScreenshotList::default();
        list.clear();
        list.truncate_front(10);
        assert_eq!(list.revision(), 0);

        list.replace(entries(5), 100, UnixTimeMs(0));
        assert_eq!(list.revision(), 1);
        list.truncate_front(5);
        assert_eq!(list.revision(), 1);
        list.truncate_front(2);
        assert_eq!(list.revision(), 2);
        list.clear();
        assert_eq!(list.revision(), 3);
    }

    #[test]
    fn truncate_front_drops_oldest() {
        let mut list = ScreenshotList::default();
        list.replace(entries(5), 100, UnixTimeMs(0));
        list.truncate_front(2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.path_at(0), Some("/tmp/shot-3.png"));
    }

    #[test]
    fn solution_payload_missing() {
        assert_eq!(Solution::from_payload(None), Err(PayloadError::Missing));
        assert_eq!(Solution::from_payload(Some(Value::Null)), Err(PayloadError::Missing));
    }

    #[test]
    fn solution_payload_wrong_shape() {
        assert!(matches!(
            Solution::from_payload(Some(json!("code"))),
            Err(PayloadError::Invalid { target: "solution", .. })
        ));
        assert!(matches!(
            Solution::from_payload(Some(json!({ "thoughts": "not a list" }))),
            Err(PayloadError::Invalid { .. })
        ));
        assert_eq!(
            Solution::from_payload(Some(json!({}))),
            Err(PayloadError::Empty { target: "solution" })
        );
    }

    #[test]
    fn partial_solution_accepted() {
        let solution = Solution::from_payload(Some(json!({ "code": "fn main() {}" }))).unwrap();
        assert!(solution.has_code());
        assert!(!solution.has_thoughts());
        assert!(!solution.has_complexity());
    }

    #[test]
    fn problem_statement_ignores_extra_fields() {
        let statement = ProblemStatement::from_payload(json!({
            "problem_statement": "Reverse a string",
            "input_format": { "description": "s" }
        }))
        .unwrap();
        assert_eq!(statement.problem_statement, "Reverse a string");
    }

    #[test]
    fn blank_problem_statement_rejected() {
        assert!(ProblemStatement::from_payload(json!({ "problem_statement": "  " })).is_err());
    }

    #[test]
    fn mount_state_rejects_stale_epoch() {
        let mount = MountState { active: true, epoch: 2 };
        assert!(mount.accepts(2));
        assert!(!mount.accepts(1));
        assert!(!MountState { active: false, epoch: 2 }.accepts(2));
    }
}
