//! View selection and the view model handed to the shell.
//!
//! [`select_view`] is the only place that decides between the queue, solution
//! and debug screens. It reads nothing but [`ViewInputs`], so the same inputs
//! always pick the same screen.

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::model::{Model, Solution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewInputs {
    pub is_resetting: bool,
    pub has_new_solution: bool,
    pub has_solution: bool,
    pub has_problem_statement: bool,
    pub is_solution_loading: bool,
}

impl ViewInputs {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        Self {
            is_resetting: model.is_resetting,
            has_new_solution: model.debug_solution().is_some(),
            has_solution: model.solution().is_some(),
            has_problem_statement: model.problem_statement().is_some(),
            is_solution_loading: model.cache.is_stale(CacheKey::Solution),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Queue,
    Solution,
    Debug,
}

/// Reset wins over everything, then a debug revision, then whatever the base
/// layout has to show.
#[must_use]
pub const fn select_view(inputs: ViewInputs) -> ViewKind {
    if inputs.is_resetting {
        ViewKind::Queue
    } else if inputs.has_new_solution {
        ViewKind::Debug
    } else if inputs.has_solution || inputs.has_problem_statement || inputs.is_solution_loading {
        ViewKind::Solution
    } else {
        ViewKind::Queue
    }
}

/// Complexity strings that already read `O(...)` are kept as they are;
/// anything else is wrapped. Blank input has nothing to show.
#[must_use]
pub fn format_complexity(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let already_wrapped = trimmed
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("o("));
    if already_wrapped {
        Some(trimmed.to_string())
    } else {
        Some(format!("O({trimmed})"))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplexityView {
    pub time: Option<String>,
    pub space: Option<String>,
}

/// One solution broken into independently gated blocks.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolutionBlocks {
    pub thoughts: Option<Vec<String>>,
    pub code: Option<String>,
    pub complexity: Option<ComplexityView>,
}

impl From<&Solution> for SolutionBlocks {
    fn from(solution: &Solution) -> Self {
        let thoughts = solution.has_thoughts().then(|| {
            solution
                .thoughts
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect()
        });
        let code = solution.has_code().then(|| solution.code.clone());
        let complexity = solution.has_complexity().then(|| ComplexityView {
            time: format_complexity(&solution.time_complexity),
            space: format_complexity(&solution.space_complexity),
        });
        Self {
            thoughts,
            code,
            complexity,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenshotView {
    pub id: String,
    pub path: String,
    pub preview: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Queue,
    Solution {
        /// Only while no solution is cached.
        problem_statement: Option<String>,
        blocks: SolutionBlocks,
        is_loading: bool,
    },
    Debug {
        blocks: SolutionBlocks,
        /// Code of the primary solution the revision was made against.
        original_code: Option<String>,
    },
}

impl ViewState {
    #[must_use]
    pub const fn kind(&self) -> ViewKind {
        match self {
            Self::Queue => ViewKind::Queue,
            Self::Solution { .. } => ViewKind::Solution,
            Self::Debug { .. } => ViewKind::Debug,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub state: ViewState,
    pub screenshots: Vec<ScreenshotView>,
    pub is_resetting: bool,
    pub is_debug_processing: bool,
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let inputs = ViewInputs::from_model(model);
        let state = match select_view(inputs) {
            ViewKind::Queue => ViewState::Queue,
            ViewKind::Solution => {
                let solution = model.solution();
                let problem_statement = if solution.is_none() {
                    model.problem_statement().map(|p| p.problem_statement)
                } else {
                    None
                };
                ViewState::Solution {
                    problem_statement,
                    blocks: solution.as_ref().map(SolutionBlocks::from).unwrap_or_default(),
                    is_loading: inputs.is_solution_loading,
                }
            }
            ViewKind::Debug => ViewState::Debug {
                blocks: model
                    .debug_solution()
                    .as_ref()
                    .map(SolutionBlocks::from)
                    .unwrap_or_default(),
                original_code: model
                    .solution()
                    .filter(Solution::has_code)
                    .map(|s| s.code),
            },
        };

        let screenshots = model
            .screenshots
            .iter()
            .map(|s| ScreenshotView {
                id: s.id.clone(),
                path: s.path.clone(),
                preview: s.preview.clone(),
            })
            .collect();

        Self {
            state,
            screenshots,
            is_resetting: model.is_resetting,
            is_debug_processing: model.is_debug_processing,
        }
    }

    /// Code the "copy" action should use for the current screen.
    #[must_use]
    pub fn visible_code(&self) -> Option<&str> {
        match &self.state {
            ViewState::Queue => None,
            ViewState::Solution { blocks, .. } | ViewState::Debug { blocks, .. } => {
                blocks.code.as_deref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inputs(resetting: bool, new_solution: bool, solution: bool) -> ViewInputs {
        ViewInputs {
            is_resetting: resetting,
            has_new_solution: new_solution,
            has_solution: solution,
            ..ViewInputs::default()
        }
    }

    #[test]
    fn reset_forces_queue() {
        assert_eq!(select_view(inputs(true, true, true)), ViewKind::Queue);
        assert_eq!(select_view(inputs(true, false, true)), ViewKind::Queue);
    }

    #[test]
    fn debug_beats_solution() {
        assert_eq!(select_view(inputs(false, true, true)), ViewKind::Debug);
        assert_eq!(select_view(inputs(false, true, false)), ViewKind::Debug);
    }

    #[test]
    fn empty_cache_is_queue() {
        assert_eq!(select_view(ViewInputs::default()), ViewKind::Queue);
    }

    #[test]
    fn loading_or_statement_shows_base_layout() {
        let loading = ViewInputs {
            is_solution_loading: true,
            ..ViewInputs::default()
        };
        let statement = ViewInputs {
            has_problem_statement: true,
            ..ViewInputs::default()
        };
        assert_eq!(select_view(loading), ViewKind::Solution);
        assert_eq!(select_view(statement), ViewKind::Solution);
    }

    #[test]
    fn complexity_not_double_wrapped() {
        assert_eq!(format_complexity("O(n)").as_deref(), Some("O(n)"));
        assert_eq!(format_complexity(" o(log n) ").as_deref(), Some("o(log n)"));
        assert_eq!(format_complexity("n log n").as_deref(), Some("O(n log n)"));
        assert_eq!(format_complexity("   "), None);
    }

    #[test]
    fn blocks_gate_on_their_own_fields() {
        let solution = Solution {
            code: String::new(),
            thoughts: vec!["iterate".into(), " ".into()],
            time_complexity: "n".into(),
            space_complexity: String::new(),
        };
        let blocks = SolutionBlocks::from(&solution);
        assert_eq!(blocks.code, None);
        assert_eq!(blocks.thoughts, Some(vec!["iterate".to_string()]));
        assert_eq!(
            blocks.complexity,
            Some(ComplexityView {
                time: Some("O(n)".into()),
                space: None,
            })
        );
    }

    fn any_inputs() -> impl Strategy<Value = ViewInputs> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(a, b, c, d, e)| ViewInputs {
                is_resetting: a,
                has_new_solution: b,
                has_solution: c,
                has_problem_statement: d,
                is_solution_loading: e,
            },
        )
    }

    proptest! {
        #[test]
        fn selection_is_deterministic(input in any_inputs()) {
            prop_assert_eq!(select_view(input), select_view(input));
        }

        #[test]
        fn debug_iff_revision_and_not_resetting(input in any_inputs()) {
            let is_debug = select_view(input) == ViewKind::Debug;
            prop_assert_eq!(is_debug, input.has_new_solution && !input.is_resetting);
        }

        #[test]
        fn solution_presence_never_hides_debug(input in any_inputs()) {
            let mut with = input;
            with.has_solution = true;
            let mut without = input;
            without.has_solution = false;
            if input.has_new_solution && !input.is_resetting {
                prop_assert_eq!(select_view(with), ViewKind::Debug);
                prop_assert_eq!(select_view(without), ViewKind::Debug);
            }
        }
    }
}
