//! Hierarchical probabilistic finite automaton runtime.
//!
//! An automaton is a directed graph of nodes joined by guarded transitions.
//! Each step consumes at most one input symbol, gathers the eligible edges of
//! the current node and takes one of them, running its action against a
//! caller-owned context.
//!
//! ## Core Concepts
//!
//! - **Node**: A plain state, or a sub-automaton node owning a nested automaton
//! - **Edge**: A transition with a [`Condition`], an [`Action`] and an [`EdgeKind`]
//! - **Deterministic edge**: Implicit probability of one; always beats probabilistic edges
//! - **Probabilistic edge**: Sampled by weight when no deterministic edge is eligible
//! - **Sub-automaton**: While entered, steps run inside the nested automaton; the
//!   parent's edges leaving the node compete with the nested ones and hand
//!   control back when taken
//!
//! ## Execution Model
//!
//! ```text
//! stopped --step--> running --enter sub node--> in_sub_automaton
//!    ^                 |  ^                           |
//!    +------reset------+  +------leaving edge taken---+
//! ```
//!
//! A step reports one of [`StepOutcome`]: `accepted` when it lands on an
//! accepting node, `running` when it lands elsewhere, `rejected` when nothing
//! was eligible (the cursor stays put).

mod automaton;
pub mod config;
mod edge;
mod error;
mod graph;
mod node;
mod state;
mod step;
mod sub_automaton;

pub use automaton::Automaton;
pub use config::{AutomatonConfig, ENV_NAME, ENV_SEED};
pub use edge::{always_true, match_input, nothing, Action, Condition, Edge, EdgeKind};
pub use error::{AutomatonError, AutomatonResult};
pub use node::{Node, NodeKind};
pub use state::{AutomatonState, StepOutcome};

// Core types
pub use pnfa_core::{
    percentage, probability, NodeId, Probability, ProbabilityError, WeightedSampler, WeightedTable,
};
