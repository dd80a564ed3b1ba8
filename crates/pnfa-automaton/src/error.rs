//! Error types for the automaton runtime.
//!
//! Every variant is a programmer or configuration error reported at the call
//! that triggered it. A step that finds no eligible edge is not an error; it
//! yields [`StepOutcome::Rejected`](crate::StepOutcome::Rejected).

use pnfa_core::{NodeId, ProbabilityError};
use thiserror::Error;

use crate::AutomatonState;

/// Result type alias for automaton operations.
pub type AutomatonResult<T> = Result<T, AutomatonError>;

/// Errors that can occur while building or driving an automaton.
#[derive(Debug, Error)]
pub enum AutomatonError {
    /// A node with the same id was already added.
    #[error("duplicate node: {node_id}")]
    DuplicateNode { node_id: NodeId },

    /// `set_start`/`set_accepting` referenced a node that does not exist.
    #[error("node not found: {node_id}")]
    NodeNotFound { node_id: NodeId },

    /// An edge endpoint references a node that does not exist.
    #[error("unknown node referenced by edge: {node_id}")]
    UnknownNode { node_id: NodeId },

    /// A sub-automaton node cannot be the start node.
    #[error("invalid start node {node_id}: sub-automaton nodes must be reached through a transition")]
    InvalidStartNode { node_id: NodeId },

    /// A sub-automaton node cannot be accepting.
    #[error("sub-automaton node {node_id} cannot be marked as accepting")]
    AcceptingSubAutomaton { node_id: NodeId },

    /// The graph is frozen once execution has begun.
    #[error("graph mutation attempted while automaton is {state:?}")]
    MutationWhileRunning { state: AutomatonState },

    /// `step`/`reset` called before a start node was configured.
    #[error("no start node defined")]
    NoStartNode,

    /// The automaton reached an inconsistent state.
    #[error("automaton inconsistency: {message}")]
    InconsistentState { message: String },

    /// Probability construction error.
    #[error("probability error: {0}")]
    Probability(#[from] ProbabilityError),

    /// Configuration parsing error.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl AutomatonError {
    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState {
            message: message.into(),
        }
    }
}
