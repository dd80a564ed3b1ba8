//! Sub-automaton composition.
//!
//! While a graph rests on a sub-automaton node every step is delegated to the
//! nested automaton. The parent's edges leaving that node are handed down as
//! [`Exit`]s so the nested automaton can compete them against its own edges;
//! taking one hands control back to the parent, which adopts the destination.
//!
//! Reaching an accepting node inside the nested automaton does not exit it.

use pnfa_core::NodeId;
use rand::Rng;
use tracing::debug;

use crate::automaton::Automaton;
use crate::edge::Edge;
use crate::error::{AutomatonError, AutomatonResult};
use crate::graph::StateGraph;
use crate::node::Node;
use crate::state::{AutomatonState, StepOutcome};

/// A parent edge leaving a sub-automaton node.
pub(crate) struct Exit<I, S> {
    pub(crate) target: NodeId,
    pub(crate) edge: Edge<I, S>,
}

impl<I, S> StateGraph<I, S> {
    /// Forward a step into the nested automaton at the current node.
    pub(crate) fn delegate<R: Rng + ?Sized>(
        &mut self,
        input: Option<&I>,
        state: &mut S,
        rng: &mut R,
    ) -> AutomatonResult<StepOutcome> {
        let current = self
            .current
            .ok_or_else(|| AutomatonError::inconsistent("in sub-automaton without a current node"))?;
        let idx = self
            .index_of(current)
            .ok_or_else(|| AutomatonError::inconsistent(format!("sub-automaton node {current} is not in the graph")))?;

        // Recomputed on every delegated step.
        let exits: Vec<Exit<I, S>> = self
            .outgoing(idx)
            .map(|(target, edge)| Exit {
                target,
                edge: edge.clone(),
            })
            .collect();

        let nested = self
            .graph
            .node_weight_mut(idx)
            .and_then(Node::nested_mut)
            .ok_or_else(|| AutomatonError::inconsistent(format!("node {current} is not a sub-automaton")))?;

        let outcome = nested.graph.step(input, state, rng, &exits)?;
        if outcome != StepOutcome::ExitedSubAutomaton {
            return Ok(outcome);
        }

        let target = nested
            .graph
            .current
            .ok_or_else(|| AutomatonError::inconsistent("sub-automaton exited without a destination"))?;
        nested.graph.rewind();

        self.state = AutomatonState::Running;
        self.current = Some(target);
        debug!(node = %current, to = %target, "sub_automaton_exit");

        self.settle(target)
    }
}

impl<I, S> Automaton<I, S> {
    /// Prepare this automaton to live inside a sub-automaton node.
    pub(crate) fn embed_as(&mut self, node_id: NodeId) {
        self.graph.embedded_as = Some(node_id);
        self.graph.rewind();
    }

    /// Whether this automaton is embedded in a parent.
    pub fn is_sub(&self) -> bool {
        self.graph.embedded_as.is_some()
    }

    /// The node id this automaton is embedded under, if any.
    pub fn embedded_as(&self) -> Option<NodeId> {
        self.graph.embedded_as
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::match_input;

    fn inner() -> Automaton<char, ()> {
        let mut inner = Automaton::with_seed(3);
        inner.add_start_node('I').unwrap();
        inner.add_accepting_node('J').unwrap();
        inner.add_edge('I', 'J', Edge::when(match_input('a'))).unwrap();
        inner
    }

    fn outer() -> Automaton<char, ()> {
        let mut outer = Automaton::with_seed(4);
        outer.add_start_node('A').unwrap();
        outer.add_sub_automaton('S', inner()).unwrap();
        outer.add_accepting_node('B').unwrap();
        outer.add_edge('A', 'S', Edge::when(match_input('z'))).unwrap();
        outer.add_edge('S', 'B', Edge::when(match_input('q'))).unwrap();
        outer
    }

    #[test]
    fn test_exit_adopts_destination() {
        let mut outer = outer();

        assert_eq!(outer.step(&'z', &mut ()).unwrap(), StepOutcome::Running);
        assert_eq!(outer.current_state(), AutomatonState::InSubAutomaton);

        assert_eq!(outer.step(&'q', &mut ()).unwrap(), StepOutcome::Accepted);
        assert_eq!(outer.current_state(), AutomatonState::Running);
        assert_eq!(outer.current_node(), Some(NodeId::from('B')));

        let nested = outer.sub_automaton('S').unwrap();
        assert_eq!(nested.current_state(), AutomatonState::Stopped);
        assert_eq!(nested.current_node(), Some(NodeId::from('I')));
    }

    #[test]
    fn test_nested_rejection_keeps_outer_inside() {
        let mut outer = outer();
        outer.step(&'z', &mut ()).unwrap();

        assert_eq!(outer.step(&'x', &mut ()).unwrap(), StepOutcome::Rejected);
        assert_eq!(outer.current_state(), AutomatonState::InSubAutomaton);
        assert_eq!(outer.current_node(), Some(NodeId::from('S')));
    }

    #[test]
    fn test_exit_into_another_sub_automaton() {
        let mut outer = outer();
        outer.reset().unwrap();
        // Re-enter S from S itself on 'r'.
        outer.add_edge('S', 'S', Edge::when(match_input('r'))).unwrap();

        outer.step(&'z', &mut ()).unwrap();
        outer.step(&'a', &mut ()).unwrap();
        assert_eq!(
            outer.sub_automaton('S').unwrap().current_node(),
            Some(NodeId::from('J'))
        );

        assert_eq!(outer.step(&'r', &mut ()).unwrap(), StepOutcome::Running);
        assert_eq!(outer.current_state(), AutomatonState::InSubAutomaton);
        assert_eq!(
            outer.sub_automaton('S').unwrap().current_node(),
            Some(NodeId::from('I'))
        );
    }
}
