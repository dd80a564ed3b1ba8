//! Automaton graph: node arena, adjacency and construction-time validation.
//!
//! Nodes and edges live in a `StableDiGraph` arena; cross references are
//! plain `NodeId`s resolved through an index map, so a deep copy is just a
//! clone of the arena.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use pnfa_core::NodeId;
use tracing::debug;

use crate::edge::Edge;
use crate::error::{AutomatonError, AutomatonResult};
use crate::node::Node;
use crate::state::AutomatonState;

/// Graph plus execution cursor of one automaton level.
pub(crate) struct StateGraph<I, S> {
    pub(crate) graph: StableDiGraph<Node<I, S>, Edge<I, S>>,
    index: HashMap<NodeId, NodeIndex>,
    pub(crate) start: Option<NodeId>,
    pub(crate) current: Option<NodeId>,
    pub(crate) state: AutomatonState,
    /// The id this level is known by in its parent, when embedded.
    pub(crate) embedded_as: Option<NodeId>,
}

impl<I, S> StateGraph<I, S> {
    pub(crate) fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            index: HashMap::new(),
            start: None,
            current: None,
            state: AutomatonState::Stopped,
            embedded_as: None,
        }
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    fn ensure_stopped(&self) -> AutomatonResult<()> {
        if self.state != AutomatonState::Stopped {
            return Err(AutomatonError::MutationWhileRunning { state: self.state });
        }
        Ok(())
    }

    pub(crate) fn add_node(&mut self, node: Node<I, S>) -> AutomatonResult<()> {
        self.ensure_stopped()?;

        let node_id = node.id();
        if self.index.contains_key(&node_id) {
            return Err(AutomatonError::DuplicateNode { node_id });
        }

        let sub = node.is_sub_automaton();
        let idx = self.graph.add_node(node);
        self.index.insert(node_id, idx);

        debug!(node = %node_id, sub_automaton = sub, "automaton_node_added");
        Ok(())
    }

    pub(crate) fn set_accepting(&mut self, node_id: NodeId) -> AutomatonResult<()> {
        self.ensure_stopped()?;
        self.node_mut(node_id)
            .ok_or(AutomatonError::NodeNotFound { node_id })?
            .set_accepting(true)
    }

    pub(crate) fn set_start(&mut self, node_id: NodeId) -> AutomatonResult<()> {
        self.ensure_stopped()?;

        let node = self
            .node(node_id)
            .ok_or(AutomatonError::NodeNotFound { node_id })?;
        if node.is_sub_automaton() {
            return Err(AutomatonError::InvalidStartNode { node_id });
        }

        self.start = Some(node_id);
        self.current = Some(node_id);
        Ok(())
    }

    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId, edge: Edge<I, S>) -> AutomatonResult<()> {
        self.ensure_stopped()?;

        let from_idx = *self
            .index
            .get(&from)
            .ok_or(AutomatonError::UnknownNode { node_id: from })?;
        let to_idx = *self
            .index
            .get(&to)
            .ok_or(AutomatonError::UnknownNode { node_id: to })?;

        debug!(from = %from, to = %to, kind = ?edge.kind(), "automaton_edge_added");
        self.graph.add_edge(from_idx, to_idx, edge);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cursor
    // -------------------------------------------------------------------------

    /// Return to `stopped` with the cursor on the start node.
    pub(crate) fn reset(&mut self) -> AutomatonResult<()> {
        let start = self.start.ok_or(AutomatonError::NoStartNode)?;
        self.state = AutomatonState::Stopped;
        self.current = Some(start);
        Ok(())
    }

    /// Like [`reset`](Self::reset) but tolerates a missing start node.
    pub(crate) fn rewind(&mut self) {
        self.state = AutomatonState::Stopped;
        self.current = self.start;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub(crate) fn index_of(&self, node_id: NodeId) -> Option<NodeIndex> {
        self.index.get(&node_id).copied()
    }

    pub(crate) fn node(&self, node_id: NodeId) -> Option<&Node<I, S>> {
        self.index_of(node_id).and_then(|idx| self.graph.node_weight(idx))
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node<I, S>> {
        let idx = self.index_of(node_id)?;
        self.graph.node_weight_mut(idx)
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of `idx` paired with their destination id.
    pub(crate) fn outgoing(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeId, &Edge<I, S>)> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(move |edge| (self.graph[edge.target()].id(), edge.weight()))
    }
}

impl<I, S> Clone for StateGraph<I, S> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            index: self.index.clone(),
            start: self.start,
            current: self.current,
            state: self.state,
            embedded_as: self.embedded_as,
        }
    }
}
