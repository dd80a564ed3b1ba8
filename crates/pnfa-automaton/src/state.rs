//! Execution state and step outcomes.

use serde::{Deserialize, Serialize};

/// The execution state of an automaton.
///
/// Not to be confused with the caller-owned context threaded through
/// `step`, which the automaton never stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomatonState {
    /// Not started; the graph may still be modified.
    #[default]
    Stopped,
    /// Consuming input at a plain node.
    Running,
    /// Resting on a sub-automaton node; steps are delegated to it.
    InSubAutomaton,
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The transition ended on an accepting node.
    Accepted,
    /// No edge was eligible; nothing changed.
    Rejected,
    /// A transition was taken but the automaton expects more input.
    Running,
    /// A leaving edge was taken out of a sub-automaton. Only the parent
    /// automaton ever observes this value.
    ExitedSubAutomaton,
}

impl StepOutcome {
    pub fn is_accepted(self) -> bool {
        self == StepOutcome::Accepted
    }

    pub fn is_rejected(self) -> bool {
        self == StepOutcome::Rejected
    }
}
