//! Node model.
//!
//! A node is either a plain state or a sub-automaton node that exclusively
//! owns a nested [`Automaton`]. Sub-automaton nodes can be neither accepting
//! nor the start node.

use std::fmt;

use pnfa_core::NodeId;

use crate::automaton::Automaton;
use crate::error::{AutomatonError, AutomatonResult};

/// The variant of a node.
pub enum NodeKind<I, S> {
    /// An ordinary state.
    Plain,
    /// A state that delegates steps to a nested automaton.
    SubAutomaton(Box<Automaton<I, S>>),
}

/// A state in the automaton graph.
pub struct Node<I, S> {
    id: NodeId,
    accepting: bool,
    kind: NodeKind<I, S>,
}

impl<I, S> Node<I, S> {
    /// Create a plain, non-accepting node.
    pub fn plain(id: NodeId) -> Self {
        Self {
            id,
            accepting: false,
            kind: NodeKind::Plain,
        }
    }

    /// Create a sub-automaton node taking ownership of `nested`.
    ///
    /// The nested automaton is rewound to its start position and learns the
    /// id it is embedded under.
    pub fn sub_automaton(id: NodeId, mut nested: Automaton<I, S>) -> Self {
        nested.embed_as(id);
        Self {
            id,
            accepting: false,
            kind: NodeKind::SubAutomaton(Box::new(nested)),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn kind(&self) -> &NodeKind<I, S> {
        &self.kind
    }

    pub fn is_sub_automaton(&self) -> bool {
        matches!(self.kind, NodeKind::SubAutomaton(_))
    }

    /// The nested automaton of a sub-automaton node.
    pub fn nested(&self) -> Option<&Automaton<I, S>> {
        match &self.kind {
            NodeKind::SubAutomaton(nested) => Some(nested.as_ref()),
            NodeKind::Plain => None,
        }
    }

    pub(crate) fn nested_mut(&mut self) -> Option<&mut Automaton<I, S>> {
        match &mut self.kind {
            NodeKind::SubAutomaton(nested) => Some(nested.as_mut()),
            NodeKind::Plain => None,
        }
    }

    /// Mark or unmark the node as accepting.
    ///
    /// # Errors
    /// Fails for sub-automaton nodes.
    pub fn set_accepting(&mut self, accepting: bool) -> AutomatonResult<()> {
        if self.is_sub_automaton() {
            return Err(AutomatonError::AcceptingSubAutomaton { node_id: self.id });
        }
        self.accepting = accepting;
        Ok(())
    }
}

impl<I, S> Clone for NodeKind<I, S> {
    fn clone(&self) -> Self {
        match self {
            NodeKind::Plain => NodeKind::Plain,
            NodeKind::SubAutomaton(nested) => NodeKind::SubAutomaton(nested.clone()),
        }
    }
}

impl<I, S> Clone for Node<I, S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            accepting: self.accepting,
            kind: self.kind.clone(),
        }
    }
}

impl<I, S> fmt::Debug for Node<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Plain => "plain",
            NodeKind::SubAutomaton(_) => "sub_automaton",
        };
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("accepting", &self.accepting)
            .field("kind", &kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_node() {
        let mut node: Node<char, ()> = Node::plain(NodeId(1));
        assert!(!node.is_accepting());
        assert!(!node.is_sub_automaton());
        assert!(node.nested().is_none());

        node.set_accepting(true).unwrap();
        assert!(node.is_accepting());
    }

    #[test]
    fn test_sub_automaton_cannot_accept() {
        let mut inner: Automaton<char, ()> = Automaton::with_seed(1);
        inner.add_start_node('I').unwrap();

        let mut node = Node::sub_automaton(NodeId::from('S'), inner);
        assert!(node.is_sub_automaton());
        assert!(matches!(
            node.set_accepting(true),
            Err(AutomatonError::AcceptingSubAutomaton { .. })
        ));
        assert!(!node.is_accepting());
    }

    #[test]
    fn test_sub_automaton_knows_embedding() {
        let mut inner: Automaton<char, ()> = Automaton::with_seed(1);
        inner.add_start_node('I').unwrap();

        let node = Node::sub_automaton(NodeId::from('S'), inner);
        let nested = node.nested().unwrap();
        assert!(nested.is_sub());
        assert_eq!(nested.embedded_as(), Some(NodeId::from('S')));
    }
}
