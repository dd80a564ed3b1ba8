//! A traffic light with a pedestrian crossing phase.
//!
//! The light cycles through its colors on probabilistic timers. After red it
//! sometimes runs a nested crossing automaton (walk, then flash three times)
//! and only leaves it through the parent's `Crossing -> Green` edge.
//!
//! Run with:
//! ```bash
//! PNFA_SEED=7 RUST_LOG=pnfa_automaton=debug cargo run --example traffic_light -p pnfa-automaton
//! ```

use pnfa_automaton::{
    Action, Automaton, AutomatonConfig, Condition, Edge, NodeId, Probability, StepOutcome,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// =============================================================================
// States
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Light {
    Red,
    Green,
    Yellow,
    Crossing,
    Walk,
    Flash,
}

impl From<Light> for NodeId {
    fn from(light: Light) -> Self {
        NodeId(light as u64)
    }
}

impl TryFrom<NodeId> for Light {
    type Error = NodeId;

    fn try_from(id: NodeId) -> Result<Self, Self::Error> {
        [Light::Red, Light::Green, Light::Yellow, Light::Crossing, Light::Walk, Light::Flash]
            .into_iter()
            .find(|light| NodeId::from(*light) == id)
            .ok_or(id)
    }
}

/// Caller-owned context threaded through every condition and action.
#[derive(Debug, Default)]
struct Intersection {
    cycles: u32,
    flashes: u32,
    crossings: u32,
}

// =============================================================================
// Construction
// =============================================================================

fn crossing() -> anyhow::Result<Automaton<(), Intersection>> {
    let mut crossing = Automaton::new();
    crossing.add_start_node(Light::Walk)?;
    crossing.add_node(Light::Flash)?;

    crossing.add_edge(
        Light::Walk,
        Light::Flash,
        Edge::new().with_action(Action::new(|_, x: &mut Intersection| x.flashes = 0)),
    )?;
    crossing.add_edge(
        Light::Flash,
        Light::Flash,
        Edge::when(Condition::new(|_, x: &Intersection| x.flashes < 3))
            .with_action(Action::new(|_, x: &mut Intersection| x.flashes += 1)),
    )?;

    Ok(crossing)
}

fn traffic_light(config: AutomatonConfig) -> anyhow::Result<Automaton<(), Intersection>> {
    let mut light = Automaton::with_config(config);
    light.add_start_node(Light::Red)?;
    light.add_accepting_node(Light::Green)?;
    light.add_node(Light::Yellow)?;
    light.add_sub_automaton(Light::Crossing, crossing()?)?;

    let half = Probability::new(0.5)?;
    light.add_edge(Light::Red, Light::Green, Edge::probabilistic(half))?;
    light.add_edge(
        Light::Red,
        Light::Crossing,
        Edge::probabilistic(half).with_action(Action::new(|_, x: &mut Intersection| x.crossings += 1)),
    )?;

    light.add_edge(Light::Green, Light::Green, Edge::probabilistic(Probability::new(0.7)?))?;
    light.add_edge(Light::Green, Light::Yellow, Edge::probabilistic(Probability::new(0.3)?))?;

    light.add_edge(
        Light::Yellow,
        Light::Red,
        Edge::new().with_action(Action::new(|_, x: &mut Intersection| x.cycles += 1)),
    )?;

    // Leaves the crossing phase once flashing is over.
    light.add_edge(
        Light::Crossing,
        Light::Green,
        Edge::when(Condition::new(|_, x: &Intersection| x.flashes >= 3)),
    )?;

    Ok(light)
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = AutomatonConfig::from_env();
    if config.seed.is_none() {
        config = config.with_seed(7);
    }
    let mut light = traffic_light(config)?;
    let mut intersection = Intersection::default();

    for tick in 0..40 {
        let outcome = light.tick(&mut intersection)?;
        let at = light.current_node_as::<Light>();
        info!(tick, light = ?at, state = ?light.current_state(), outcome = ?outcome, "tick");

        if outcome == StepOutcome::Rejected {
            anyhow::bail!("traffic light stuck at {at:?}");
        }
    }

    light.reset()?;
    println!(
        "{} full cycles, {} pedestrian crossings",
        intersection.cycles, intersection.crossings
    );
    Ok(())
}
