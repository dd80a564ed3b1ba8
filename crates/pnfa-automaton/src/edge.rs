//! Edge model: guarded, optionally weighted transitions.
//!
//! An edge carries a [`Condition`] deciding whether it is eligible for the
//! current input and caller state, an [`Action`] run when it is taken, and an
//! [`EdgeKind`] telling the step algorithm how to choose among competitors.

use std::fmt;
use std::sync::Arc;

use pnfa_core::Probability;

type PredicateFn<I, S> = dyn Fn(Option<&I>, &S) -> bool + Send + Sync;
type EffectFn<I, S> = dyn Fn(Option<&I>, &mut S) + Send + Sync;

// =============================================================================
// Conditions
// =============================================================================

/// Predicate capability deciding whether an edge may be taken.
///
/// Receives the input symbol (`None` for input-less automatons) and a shared
/// borrow of the caller's state. Cloning is cheap; clones share the
/// underlying predicate.
pub struct Condition<I, S> {
    kind: ConditionKind<I, S>,
}

enum ConditionKind<I, S> {
    Always,
    Predicate(Arc<PredicateFn<I, S>>),
}

impl<I, S> Condition<I, S> {
    /// Wrap a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(Option<&I>, &S) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: ConditionKind::Predicate(Arc::new(predicate)),
        }
    }

    /// A condition that never blocks a transition.
    pub fn always() -> Self {
        Self {
            kind: ConditionKind::Always,
        }
    }

    /// Evaluate against the given input and state.
    pub fn check(&self, input: Option<&I>, state: &S) -> bool {
        match &self.kind {
            ConditionKind::Always => true,
            ConditionKind::Predicate(predicate) => predicate(input, state),
        }
    }

    /// Whether this is the unconditional `always` guard.
    pub fn is_always(&self) -> bool {
        matches!(self.kind, ConditionKind::Always)
    }
}

impl<I: 'static, S: 'static> Condition<I, S> {
    /// Both conditions must hold.
    pub fn and(self, other: Self) -> Self {
        Self::new(move |input, state| self.check(input, state) && other.check(input, state))
    }

    /// Either condition must hold.
    pub fn or(self, other: Self) -> Self {
        Self::new(move |input, state| self.check(input, state) || other.check(input, state))
    }

    /// Invert the condition.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::new(move |input, state| !self.check(input, state))
    }
}

impl<I, S> Clone for Condition<I, S> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            ConditionKind::Always => ConditionKind::Always,
            ConditionKind::Predicate(predicate) => ConditionKind::Predicate(Arc::clone(predicate)),
        };
        Self { kind }
    }
}

impl<I, S> Default for Condition<I, S> {
    fn default() -> Self {
        Self::always()
    }
}

impl<I, S> fmt::Debug for Condition<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConditionKind::Always => f.write_str("Condition(always)"),
            ConditionKind::Predicate(_) => f.write_str("Condition(..)"),
        }
    }
}

/// Condition that never blocks a transition.
pub fn always_true<I, S>() -> Condition<I, S> {
    Condition::always()
}

/// Condition requiring the input symbol to equal `expected`.
///
/// Never matches when the automaton is stepped without input.
pub fn match_input<I, S>(expected: I) -> Condition<I, S>
where
    I: PartialEq + Send + Sync + 'static,
    S: 'static,
{
    Condition::new(move |input, _| input == Some(&expected))
}

// =============================================================================
// Actions
// =============================================================================

/// Side-effect capability run when an edge is taken.
///
/// Receives the input symbol and an exclusive borrow of the caller's state
/// for the duration of the call.
pub struct Action<I, S> {
    kind: ActionKind<I, S>,
}

enum ActionKind<I, S> {
    Nothing,
    Effect(Arc<EffectFn<I, S>>),
}

impl<I, S> Action<I, S> {
    /// Wrap a side effect.
    pub fn new<F>(effect: F) -> Self
    where
        F: Fn(Option<&I>, &mut S) + Send + Sync + 'static,
    {
        Self {
            kind: ActionKind::Effect(Arc::new(effect)),
        }
    }

    /// The no-op action.
    pub fn nothing() -> Self {
        Self {
            kind: ActionKind::Nothing,
        }
    }

    /// Run the action.
    pub fn run(&self, input: Option<&I>, state: &mut S) {
        if let ActionKind::Effect(effect) = &self.kind {
            effect(input, state);
        }
    }
}

impl<I: 'static, S: 'static> Action<I, S> {
    /// Run `self`, then `next`.
    pub fn then(self, next: Self) -> Self {
        Self::new(move |input, state| {
            self.run(input, state);
            next.run(input, state);
        })
    }
}

impl<I, S> Clone for Action<I, S> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            ActionKind::Nothing => ActionKind::Nothing,
            ActionKind::Effect(effect) => ActionKind::Effect(Arc::clone(effect)),
        };
        Self { kind }
    }
}

impl<I, S> Default for Action<I, S> {
    fn default() -> Self {
        Self::nothing()
    }
}

impl<I, S> fmt::Debug for Action<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Nothing => f.write_str("Action(nothing)"),
            ActionKind::Effect(_) => f.write_str("Action(..)"),
        }
    }
}

/// The no-op action.
pub fn nothing<I, S>() -> Action<I, S> {
    Action::nothing()
}

// =============================================================================
// Edges
// =============================================================================

/// How an edge competes with the other eligible edges of its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeKind {
    /// Implicit probability of one; always preferred over probabilistic edges.
    Deterministic,
    /// Chosen by weight, only when no deterministic edge is eligible.
    Probabilistic(Probability),
}

impl EdgeKind {
    /// The weight this kind carries, if any.
    pub fn probability(&self) -> Option<Probability> {
        match self {
            EdgeKind::Deterministic => None,
            EdgeKind::Probabilistic(p) => Some(*p),
        }
    }
}

/// A transition description handed to [`Automaton::add_edge`](crate::Automaton::add_edge).
///
/// ```
/// use pnfa_automaton::{match_input, Action, Edge, Probability};
///
/// let plain: Edge<char, ()> = Edge::new();
/// let guarded: Edge<char, u32> = Edge::when(match_input('a'))
///     .with_action(Action::new(|_, count: &mut u32| *count += 1));
/// let weighted: Edge<char, ()> = Edge::probabilistic(Probability::new(0.25).unwrap());
/// # let _ = (plain, guarded, weighted);
/// ```
pub struct Edge<I, S> {
    kind: EdgeKind,
    condition: Condition<I, S>,
    action: Action<I, S>,
}

impl<I, S> Edge<I, S> {
    /// Deterministic, unconditional edge without side effect.
    pub fn new() -> Self {
        Self {
            kind: EdgeKind::Deterministic,
            condition: Condition::always(),
            action: Action::nothing(),
        }
    }

    /// Deterministic edge guarded by `condition`.
    pub fn when(condition: Condition<I, S>) -> Self {
        Self::new().with_condition(condition)
    }

    /// Unconditional probabilistic edge.
    pub fn probabilistic(probability: Probability) -> Self {
        Self {
            kind: EdgeKind::Probabilistic(probability),
            ..Self::new()
        }
    }

    /// Replace the condition.
    pub fn with_condition(mut self, condition: Condition<I, S>) -> Self {
        self.condition = condition;
        self
    }

    /// Replace the action.
    pub fn with_action(mut self, action: Action<I, S>) -> Self {
        self.action = action;
        self
    }

    /// Turn into a probabilistic edge with the given weight.
    pub fn with_probability(mut self, probability: Probability) -> Self {
        self.kind = EdgeKind::Probabilistic(probability);
        self
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn condition(&self) -> &Condition<I, S> {
        &self.condition
    }

    pub fn action(&self) -> &Action<I, S> {
        &self.action
    }

    /// Whether the edge may be taken for this input and state.
    pub fn is_eligible(&self, input: Option<&I>, state: &S) -> bool {
        self.condition.check(input, state)
    }

    /// Run the attached action.
    pub fn fire(&self, input: Option<&I>, state: &mut S) {
        self.action.run(input, state);
    }
}

impl<I, S> Clone for Edge<I, S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            condition: self.condition.clone(),
            action: self.action.clone(),
        }
    }
}

impl<I, S> Default for Edge<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> fmt::Debug for Edge<I, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("kind", &self.kind)
            .field("condition", &self.condition)
            .field("action", &self.action)
            .finish()
    }
}
