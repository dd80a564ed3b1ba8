//! Single-symbol transition step.
//!
//! A step gathers the eligible outgoing edges of the current node (plus the
//! parent's leaving edges when running as a sub-automaton), picks one, runs
//! its action and moves the cursor. Deterministic edges carry an implicit
//! probability of one and always beat probabilistic ones; weights only decide
//! among edges that are all probabilistic.

use pnfa_core::{NodeId, WeightedSampler};
use rand::Rng;
use tracing::{debug, trace};

use crate::edge::{Edge, EdgeKind};
use crate::error::{AutomatonError, AutomatonResult};
use crate::graph::StateGraph;
use crate::state::{AutomatonState, StepOutcome};
use crate::sub_automaton::Exit;

/// An eligible transition for the current step.
struct Candidate<'a, I, S> {
    target: NodeId,
    edge: &'a Edge<I, S>,
    /// Taken from the parent's adjacency: leaves the sub-automaton.
    leaving: bool,
}

impl<I, S> StateGraph<I, S> {
    /// Consume one input symbol (or none).
    ///
    /// `exits` are the parent's edges leaving the node this graph is embedded
    /// under; empty for a top-level automaton.
    pub(crate) fn step<R: Rng + ?Sized>(
        &mut self,
        input: Option<&I>,
        state: &mut S,
        rng: &mut R,
        exits: &[Exit<I, S>],
    ) -> AutomatonResult<StepOutcome> {
        if self.state == AutomatonState::Stopped {
            let start = self.start.ok_or(AutomatonError::NoStartNode)?;
            self.current = Some(start);
            self.state = AutomatonState::Running;
        }

        if self.state == AutomatonState::InSubAutomaton {
            return self.delegate(input, state, rng);
        }

        let current = self
            .current
            .ok_or_else(|| AutomatonError::inconsistent("running without a current node"))?;
        let idx = self
            .index_of(current)
            .ok_or_else(|| AutomatonError::inconsistent(format!("current node {current} is not in the graph")))?;

        let (target, leaving) = {
            let mut candidates: Vec<Candidate<'_, I, S>> = self
                .outgoing(idx)
                .filter(|(_, edge)| edge.is_eligible(input, &*state))
                .map(|(target, edge)| Candidate {
                    target,
                    edge,
                    leaving: false,
                })
                .collect();

            if self.embedded_as.is_some() {
                candidates.extend(
                    exits
                        .iter()
                        .filter(|exit| exit.edge.is_eligible(input, &*state))
                        .map(|exit| Candidate {
                            target: exit.target,
                            edge: &exit.edge,
                            leaving: true,
                        }),
                );
            }

            trace!(node = %current, eligible = candidates.len(), "automaton_step");

            if candidates.is_empty() {
                debug!(node = %current, "automaton_rejected");
                return Ok(StepOutcome::Rejected);
            }

            let chosen = select(&candidates, rng)
                .and_then(|pick| candidates.get(pick))
                .ok_or_else(|| AutomatonError::inconsistent("no transition could be selected"))?;

            chosen.edge.fire(input, state);
            (chosen.target, chosen.leaving)
        };

        self.current = Some(target);

        if leaving {
            debug!(from = %current, to = %target, "sub_automaton_leaving_edge");
            return Ok(StepOutcome::ExitedSubAutomaton);
        }

        debug!(from = %current, to = %target, "automaton_transition");
        self.settle(target)
    }

    /// Report on the node the cursor just arrived at, entering it if it is a
    /// sub-automaton.
    pub(crate) fn settle(&mut self, node_id: NodeId) -> AutomatonResult<StepOutcome> {
        let node = self
            .node_mut(node_id)
            .ok_or_else(|| AutomatonError::inconsistent(format!("destination {node_id} is not in the graph")))?;

        if let Some(nested) = node.nested_mut() {
            nested.graph.rewind();
            self.state = AutomatonState::InSubAutomaton;
            debug!(node = %node_id, "sub_automaton_enter");
            return Ok(StepOutcome::Running);
        }

        if node.is_accepting() {
            Ok(StepOutcome::Accepted)
        } else {
            Ok(StepOutcome::Running)
        }
    }
}

/// Pick the index of the candidate to take.
///
/// Deterministic candidates are chosen uniformly and shadow every
/// probabilistic one; otherwise candidates are sampled by weight.
fn select<I, S, R: Rng + ?Sized>(candidates: &[Candidate<'_, I, S>], rng: &mut R) -> Option<usize> {
    let deterministic: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c.edge.kind(), EdgeKind::Deterministic))
        .map(|(i, _)| i)
        .collect();

    if !deterministic.is_empty() {
        return deterministic.get(rng.random_range(0..deterministic.len())).copied();
    }

    let sampler: WeightedSampler<usize> = candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c.edge.kind() {
            EdgeKind::Probabilistic(p) => Some((i, p)),
            EdgeKind::Deterministic => None,
        })
        .collect();

    sampler.sample(rng).copied()
}
