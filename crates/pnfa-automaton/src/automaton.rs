//! The automaton facade.
//!
//! `Automaton` is the main entry point: build the graph with the `add_*` /
//! `set_*` calls, then drive it with [`step`](Automaton::step),
//! [`tick`](Automaton::tick) or [`run`](Automaton::run).

use std::fmt;

use pnfa_core::NodeId;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, debug_span, info};

use crate::config::AutomatonConfig;
use crate::edge::Edge;
use crate::error::{AutomatonError, AutomatonResult};
use crate::graph::StateGraph;
use crate::node::Node;
use crate::state::{AutomatonState, StepOutcome};

/// A hierarchical probabilistic finite automaton.
///
/// `I` is the input symbol type and `S` the caller-owned context threaded
/// through every condition and action. Automatons that consume no symbols
/// still pick an `I` (usually `()`) and are driven with [`tick`](Self::tick).
///
/// ```
/// use pnfa_automaton::{match_input, Automaton, Edge, StepOutcome};
///
/// let mut automaton: Automaton<char> = Automaton::with_seed(1);
/// automaton.add_start_node('A')?;
/// automaton.add_accepting_node('B')?;
/// automaton.add_edge('A', 'B', Edge::when(match_input('c')))?;
///
/// assert_eq!(automaton.step(&'c', &mut ())?, StepOutcome::Accepted);
/// # Ok::<(), pnfa_automaton::AutomatonError>(())
/// ```
pub struct Automaton<I, S = ()> {
    pub(crate) graph: StateGraph<I, S>,

    /// Pseudo-random source. Unused while embedded; nested automatons draw
    /// from the top-level generator.
    rng: StdRng,

    config: AutomatonConfig,
}

impl<I, S> Automaton<I, S> {
    /// Create an empty automaton seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_config(AutomatonConfig::default())
    }

    /// Create an empty automaton with a deterministic seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(AutomatonConfig::default().with_seed(seed))
    }

    /// Create with custom configuration.
    pub fn with_config(config: AutomatonConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            graph: StateGraph::new(),
            rng,
            config,
        }
    }

    /// Create with an injected random source.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            graph: StateGraph::new(),
            rng,
            config: AutomatonConfig::default(),
        }
    }

    /// Get the automaton configuration.
    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Add a plain node.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> AutomatonResult<()> {
        self.graph.add_node(Node::plain(id.into()))
    }

    /// Add a node that owns `nested` and delegates to it once entered.
    pub fn add_sub_automaton(&mut self, id: impl Into<NodeId>, nested: Automaton<I, S>) -> AutomatonResult<()> {
        self.graph.add_node(Node::sub_automaton(id.into(), nested))
    }

    /// Add a node and mark it accepting.
    pub fn add_accepting_node(&mut self, id: impl Into<NodeId>) -> AutomatonResult<()> {
        let id = id.into();
        self.add_node(id)?;
        self.set_accepting(id)
    }

    /// Add a node and make it the start node.
    pub fn add_start_node(&mut self, id: impl Into<NodeId>) -> AutomatonResult<()> {
        let id = id.into();
        self.add_node(id)?;
        self.set_start(id)
    }

    /// Make an existing node the start node, replacing any previous one.
    pub fn set_start(&mut self, id: impl Into<NodeId>) -> AutomatonResult<()> {
        self.graph.set_start(id.into())
    }

    /// Mark an existing node as accepting.
    pub fn set_accepting(&mut self, id: impl Into<NodeId>) -> AutomatonResult<()> {
        self.graph.set_accepting(id.into())
    }

    /// Add a directed edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>, edge: Edge<I, S>) -> AutomatonResult<()> {
        self.graph.add_edge(from.into(), to.into(), edge)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn current_state(&self) -> AutomatonState {
        self.graph.state
    }

    /// The node the cursor rests on. `None` until a start node is set.
    pub fn current_node(&self) -> Option<NodeId> {
        self.graph.current
    }

    /// The current node converted into a caller id type.
    pub fn current_node_as<T: TryFrom<NodeId>>(&self) -> Option<T> {
        self.current_node().and_then(|id| T::try_from(id).ok())
    }

    pub fn start_node(&self) -> Option<NodeId> {
        self.graph.start
    }

    pub fn contains_node(&self, id: impl Into<NodeId>) -> bool {
        self.graph.index_of(id.into()).is_some()
    }

    /// Get a node by id.
    pub fn node(&self, id: impl Into<NodeId>) -> Option<&Node<I, S>> {
        self.graph.node(id.into())
    }

    /// Whether the node is accepting.
    pub fn is_accepting(&self, id: impl Into<NodeId>) -> AutomatonResult<bool> {
        let node_id = id.into();
        self.graph
            .node(node_id)
            .map(Node::is_accepting)
            .ok_or(AutomatonError::NodeNotFound { node_id })
    }

    /// The nested automaton owned by a sub-automaton node.
    pub fn sub_automaton(&self, id: impl Into<NodeId>) -> Option<&Automaton<I, S>> {
        self.graph.node(id.into()).and_then(Node::nested)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Stop the automaton and put the cursor back on the start node.
    pub fn reset(&mut self) -> AutomatonResult<()> {
        self.graph.reset()?;
        debug!(automaton = %self.config.name, "automaton_reset");
        Ok(())
    }

    /// Perform one step with an optional input symbol.
    ///
    /// Starts the automaton if it is stopped. A `Rejected` outcome leaves the
    /// cursor where it was; the caller decides whether to reset.
    pub fn advance(&mut self, input: Option<&I>, state: &mut S) -> AutomatonResult<StepOutcome> {
        let _span = debug_span!("automaton", name = %self.config.name).entered();
        self.graph.step(input, state, &mut self.rng, &[])
    }

    /// Consume one input symbol.
    pub fn step(&mut self, input: &I, state: &mut S) -> AutomatonResult<StepOutcome> {
        self.advance(Some(input), state)
    }

    /// Step without an input symbol.
    pub fn tick(&mut self, state: &mut S) -> AutomatonResult<StepOutcome> {
        self.advance(None, state)
    }

    /// Feed a complete input sequence, then reset.
    ///
    /// Stops early on rejection. Anything but a final `Accepted` is reported
    /// as `Rejected`.
    pub fn run<'a, It>(&mut self, inputs: It, state: &mut S) -> AutomatonResult<StepOutcome>
    where
        It: IntoIterator<Item = &'a I>,
        I: 'a,
    {
        info!(automaton = %self.config.name, "automaton_run_start");

        let mut outcome = StepOutcome::Running;
        let mut consumed = 0usize;
        for input in inputs {
            outcome = self.step(input, state)?;
            consumed += 1;
            if outcome == StepOutcome::Rejected {
                break;
            }
        }

        self.finish_run(outcome, consumed)
    }

    /// [`run`](Self::run) for input-less automatons: up to `ticks` steps.
    pub fn run_ticks(&mut self, ticks: usize, state: &mut S) -> AutomatonResult<StepOutcome> {
        info!(automaton = %self.config.name, ticks, "automaton_run_start");

        let mut outcome = StepOutcome::Running;
        let mut consumed = 0usize;
        for _ in 0..ticks {
            outcome = self.tick(state)?;
            consumed += 1;
            if outcome == StepOutcome::Rejected {
                break;
            }
        }

        self.finish_run(outcome, consumed)
    }

    fn finish_run(&mut self, last: StepOutcome, consumed: usize) -> AutomatonResult<StepOutcome> {
        let verdict = if last == StepOutcome::Accepted {
            StepOutcome::Accepted
        } else {
            StepOutcome::Rejected
        };

        self.reset()?;

        info!(
            automaton = %self.config.name,
            consumed,
            verdict = ?verdict,
            "automaton_run_complete"
        );
        Ok(verdict)
    }
}

impl<I, S> Default for Automaton<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> Clone for Automaton<I, S> {
    /// Deep copy of every node and edge. The copy gets a fresh random source.
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            rng: StdRng::from_os_rng(),
            config: self.config.clone(),
        }
    }
}

impl<I, S> fmt::Debug for Automaton<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("name", &self.config.name)
            .field("state", &self.graph.state)
            .field("current_node", &self.graph.current)
            .field("start_node", &self.graph.start)
            .field("node_count", &self.graph.node_count())
            .field("edge_count", &self.graph.edge_count())
            .field("embedded_as", &self.graph.embedded_as)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{match_input, Action, Condition};
    use pnfa_core::Probability;

    fn two_node() -> Automaton<char> {
        let mut automaton = Automaton::with_seed(17);
        automaton.add_start_node('A').unwrap();
        automaton.add_accepting_node('B').unwrap();
        automaton.add_edge('A', 'B', Edge::when(match_input('c'))).unwrap();
        automaton
    }

    #[test]
    fn test_automaton_creation() {
        let automaton = two_node();

        assert_eq!(automaton.node_count(), 2);
        assert_eq!(automaton.edge_count(), 1);
        assert_eq!(automaton.current_state(), AutomatonState::Stopped);
        assert_eq!(automaton.start_node(), Some(NodeId::from('A')));
        assert!(automaton.is_accepting('B').unwrap());
        assert!(!automaton.is_accepting('A').unwrap());
        assert!(automaton.contains_node('A'));
        assert!(!automaton.contains_node('Z'));
    }

    #[test]
    fn test_single_step() {
        let mut automaton = two_node();

        assert_eq!(automaton.step(&'c', &mut ()).unwrap(), StepOutcome::Accepted);
        assert_eq!(automaton.current_node(), Some(NodeId::from('B')));
        assert_eq!(automaton.current_node_as::<char>(), Some('B'));
        assert_eq!(automaton.current_state(), AutomatonState::Running);
    }

    #[test]
    fn test_rejection_leaves_cursor() {
        let mut automaton = two_node();

        assert_eq!(automaton.step(&'x', &mut ()).unwrap(), StepOutcome::Rejected);
        assert_eq!(automaton.current_node(), Some(NodeId::from('A')));
        assert_eq!(automaton.current_state(), AutomatonState::Running);
    }

    #[test]
    fn test_step_without_start() {
        let mut automaton: Automaton<char> = Automaton::with_seed(1);
        automaton.add_node('A').unwrap();

        assert!(matches!(automaton.step(&'a', &mut ()), Err(AutomatonError::NoStartNode)));
        assert!(matches!(automaton.reset(), Err(AutomatonError::NoStartNode)));
    }

    #[test]
    fn test_frozen_after_start() {
        let mut automaton = two_node();
        automaton.step(&'x', &mut ()).unwrap();

        assert!(matches!(
            automaton.add_node('C'),
            Err(AutomatonError::MutationWhileRunning { state: AutomatonState::Running })
        ));
        assert!(matches!(
            automaton.set_accepting('A'),
            Err(AutomatonError::MutationWhileRunning { .. })
        ));

        automaton.reset().unwrap();
        automaton.add_node('C').unwrap();
    }

    #[test]
    fn test_run_resets() {
        let mut automaton = two_node();

        assert_eq!(automaton.run(&['c'], &mut ()).unwrap(), StepOutcome::Accepted);
        assert_eq!(automaton.current_state(), AutomatonState::Stopped);
        assert_eq!(automaton.current_node(), Some(NodeId::from('A')));

        assert_eq!(automaton.run(&['c', 'c'], &mut ()).unwrap(), StepOutcome::Rejected);
        let empty: [char; 0] = [];
        assert_eq!(automaton.run(&empty, &mut ()).unwrap(), StepOutcome::Rejected);
    }

    #[test]
    fn test_actions_mutate_caller_state() {
        let mut automaton: Automaton<char, Vec<char>> = Automaton::with_seed(2);
        automaton.add_start_node(0u8).unwrap();
        automaton
            .add_edge(
                0u8,
                0u8,
                Edge::new().with_action(Action::new(|input: Option<&char>, seen: &mut Vec<char>| {
                    seen.extend(input.copied());
                })),
            )
            .unwrap();

        let mut seen = Vec::new();
        automaton.run(&['h', 'i'], &mut seen).unwrap();
        assert_eq!(seen, vec!['h', 'i']);
    }

    #[test]
    fn test_tick_and_run_ticks() {
        let mut automaton: Automaton<(), u32> = Automaton::with_seed(8);
        automaton.add_start_node(0u8).unwrap();
        automaton.add_accepting_node(1u8).unwrap();
        automaton
            .add_edge(
                0u8,
                0u8,
                Edge::when(Condition::new(|_, n: &u32| *n < 3)).with_action(Action::new(|_, n: &mut u32| *n += 1)),
            )
            .unwrap();
        automaton
            .add_edge(
                0u8,
                1u8,
                Edge::probabilistic(Probability::ONE).with_condition(Condition::new(|_, n: &u32| *n >= 3)),
            )
            .unwrap();

        let mut counter = 0;
        assert_eq!(automaton.tick(&mut counter).unwrap(), StepOutcome::Running);
        assert_eq!(automaton.run_ticks(10, &mut counter).unwrap(), StepOutcome::Rejected);
        assert_eq!(counter, 3);

        assert_eq!(automaton.run_ticks(1, &mut counter).unwrap(), StepOutcome::Accepted);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = two_node();
        let mut copy = original.clone();

        copy.step(&'c', &mut ()).unwrap();
        assert_eq!(copy.current_node(), Some(NodeId::from('B')));
        assert_eq!(original.current_state(), AutomatonState::Stopped);

        original.reset().unwrap();
        original.add_node('C').unwrap();
        assert_eq!(original.node_count(), 3);
        assert_eq!(copy.node_count(), 2);
    }

    #[test]
    fn test_config_name_in_debug() {
        let automaton: Automaton<char> = Automaton::with_config(AutomatonConfig::named("lexer").with_seed(1));
        let debug = format!("{automaton:?}");
        assert!(debug.contains("lexer"));
        assert_eq!(automaton.config().seed, Some(1));
    }
}
