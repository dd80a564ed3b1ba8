//! Core domain types shared across the pnfa workspace.
//!
//! This crate holds the leaf pieces the automaton runtime is built from:
//!
//! - [`NodeId`]: the opaque, totally ordered identity of a state
//! - [`Probability`]: a validated scalar in `[0, 1]`
//! - [`WeightedSampler`]: cumulative-sum sampling over `(value, weight)` pairs
//! - [`WeightedTable`]: a fixed-size bucket table for cheap repeated draws

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised when constructing probability values or weighted tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbabilityError {
    /// A probability was constructed outside of `[0, 1]`.
    #[error("probability out of range [0, 1]: {value}")]
    OutOfRange { value: f64 },

    /// A percentage was constructed outside of `[0, 100]`.
    #[error("percentage out of range [0, 100]: {value}")]
    PercentageOutOfRange { value: f64 },

    /// The weights handed to a [`WeightedTable`] add up to more than one.
    #[error("total probability cannot exceed 1, got {total}")]
    TotalExceedsOne { total: f64 },
}

// =============================================================================
// Node Identity
// =============================================================================

/// Identifier for nodes within an automaton graph.
///
/// Callers usually name their states with small integers, chars or their own
/// enums; anything with an `Into<NodeId>` conversion can be handed to the
/// automaton builders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw integer key.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(u64::from(id))
    }
}

impl From<u16> for NodeId {
    fn from(id: u16) -> Self {
        Self(u64::from(id))
    }
}

impl From<u8> for NodeId {
    fn from(id: u8) -> Self {
        Self(u64::from(id))
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        Self(id as u64)
    }
}

impl From<char> for NodeId {
    fn from(id: char) -> Self {
        Self(u64::from(u32::from(id)))
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl TryFrom<NodeId> for char {
    type Error = std::char::CharTryFromError;

    fn try_from(id: NodeId) -> Result<Self, Self::Error> {
        let code = u32::try_from(id.0).unwrap_or(u32::MAX);
        char::try_from(code)
    }
}

impl TryFrom<NodeId> for usize {
    type Error = std::num::TryFromIntError;

    fn try_from(id: NodeId) -> Result<Self, Self::Error> {
        usize::try_from(id.0)
    }
}

// =============================================================================
// Probability
// =============================================================================

/// A probability value in the closed interval `[0, 1]`.
///
/// Construction outside of that range (including `NaN`) is refused, so any
/// `Probability` in circulation is valid. Serializes as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// The impossible event.
    pub const ZERO: Probability = Probability(0.0);

    /// The certain event.
    pub const ONE: Probability = Probability(1.0);

    /// Create a probability, failing unless `0 <= value <= 1`.
    pub fn new(value: f64) -> Result<Self, ProbabilityError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProbabilityError::OutOfRange { value })
        }
    }

    /// Create a probability from a percentage in `[0, 100]`.
    pub fn percentage(value: f64) -> Result<Self, ProbabilityError> {
        if (0.0..=100.0).contains(&value) {
            Ok(Self(value / 100.0))
        } else {
            Err(ProbabilityError::PercentageOutOfRange { value })
        }
    }

    /// Get the raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Probability {
    type Error = ProbabilityError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shorthand for [`Probability::new`].
pub fn probability(value: f64) -> Result<Probability, ProbabilityError> {
    Probability::new(value)
}

/// Shorthand for [`Probability::percentage`].
pub fn percentage(value: f64) -> Result<Probability, ProbabilityError> {
    Probability::percentage(value)
}

// =============================================================================
// Weighted Sampling
// =============================================================================

/// Draws values with probability proportional to their weight.
///
/// Each draw rolls a uniform number in `[0, 1)` and walks the entries
/// accumulating weight; the first entry whose cumulative weight reaches the
/// roll wins. Weights are expected to sum to one. If they fall short (or
/// floating point drift leaves the roll past the last cumulative weight) the
/// last entry absorbs the remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSampler<T> {
    entries: Vec<(T, f64)>,
}

impl<T> Default for WeightedSampler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> WeightedSampler<T> {
    /// Create an empty sampler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value with the given weight.
    pub fn push(&mut self, value: T, weight: f64) {
        self.entries.push((value, weight));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sampler has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    /// The `(value, weight)` pairs in insertion order.
    pub fn entries(&self) -> &[(T, f64)] {
        &self.entries
    }

    /// Draw one value. Returns `None` only if the sampler is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let roll: f64 = rng.random();
        self.pick(roll)
    }

    /// Resolve a roll in `[0, 1)` to an entry.
    fn pick(&self, roll: f64) -> Option<&T> {
        let mut cumulative = 0.0;
        for (value, weight) in &self.entries {
            cumulative += weight;
            if roll <= cumulative {
                return Some(value);
            }
        }

        self.entries.last().map(|(value, _)| value)
    }
}

impl<T> FromIterator<(T, f64)> for WeightedSampler<T> {
    fn from_iter<It: IntoIterator<Item = (T, f64)>>(iter: It) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> FromIterator<(T, Probability)> for WeightedSampler<T> {
    fn from_iter<It: IntoIterator<Item = (T, Probability)>>(iter: It) -> Self {
        iter.into_iter().map(|(value, p)| (value, p.value())).collect()
    }
}

// =============================================================================
// Weighted Table
// =============================================================================

/// Slack allowed on the weight total before a table is rejected.
const TOTAL_TOLERANCE: f64 = 1e-9;

/// A fixed table of `N` slots filled in proportion to entry weights.
///
/// Every entry occupies `floor(weight * N)` slots; whatever is left over is
/// filled with `T::default()`. A draw is a single uniform index, which makes
/// repeated sampling cheaper than [`WeightedSampler`] at the cost of
/// resolution (`1 / N`).
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable<T, const N: usize = 100> {
    slots: Vec<T>,
}

impl<T: Clone + Default, const N: usize> WeightedTable<T, N> {
    /// Build the table.
    ///
    /// # Errors
    /// Returns [`ProbabilityError::TotalExceedsOne`] if the weights sum above one.
    pub fn new<It>(entries: It) -> Result<Self, ProbabilityError>
    where
        It: IntoIterator<Item = (T, f64)>,
    {
        let entries: Vec<(T, f64)> = entries.into_iter().collect();

        let total: f64 = entries.iter().map(|(_, weight)| weight).sum();
        if total > 1.0 + TOTAL_TOLERANCE {
            return Err(ProbabilityError::TotalExceedsOne { total });
        }

        let mut slots = Vec::with_capacity(N);
        for (value, weight) in entries {
            let count = ((weight.max(0.0) * N as f64) as usize).min(N - slots.len());
            slots.extend(std::iter::repeat_n(value, count));
        }
        slots.resize(N, T::default());

        Ok(Self { slots })
    }
}

impl<T, const N: usize> WeightedTable<T, N> {
    /// Draw one slot uniformly. Returns `None` only for a zero-sized table.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.slots.is_empty() {
            return None;
        }
        self.slots.get(rng.random_range(0..self.slots.len()))
    }

    /// Randomly permute the slots.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.slots.shuffle(rng);
    }

    /// All slots in their current order.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_probability_range() {
        for value in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(Probability::new(value).unwrap().value(), value);
        }
        for value in [-0.001, 1.001, -5.0, 42.0, f64::NAN] {
            assert!(matches!(
                Probability::new(value),
                Err(ProbabilityError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(50.0).unwrap(), Probability::new(0.5).unwrap());
        assert_eq!(percentage(100.0).unwrap(), Probability::ONE);
        assert_eq!(percentage(0.0).unwrap(), Probability::ZERO);
        assert!(matches!(
            percentage(150.0),
            Err(ProbabilityError::PercentageOutOfRange { value }) if value == 150.0
        ));
        assert!(percentage(-1.0).is_err());
    }

    #[test]
    fn test_probability_serde() {
        let p: Probability = serde_json::from_str("0.75").unwrap();
        assert_eq!(p.value(), 0.75);
        assert_eq!(serde_json::to_string(&p).unwrap(), "0.75");
        assert!(serde_json::from_str::<Probability>("1.5").is_err());
    }

    #[test]
    fn test_node_id_conversions() {
        assert_eq!(NodeId::from('A'), NodeId(65));
        assert_eq!(NodeId::from(7u32), NodeId(7));
        assert_eq!(NodeId::from(7usize).get(), 7);
        assert_eq!(char::try_from(NodeId::from('z')).unwrap(), 'z');
        assert!(char::try_from(NodeId(u64::MAX)).is_err());
        assert!(NodeId(1) < NodeId(2));
        assert_eq!(NodeId(3).to_string(), "#3");
    }

    #[test]
    fn test_sampler_pick_boundaries() {
        let sampler: WeightedSampler<char> = [('x', 0.2), ('y', 0.3), ('z', 0.5)].into_iter().collect();

        assert_eq!(sampler.pick(0.0), Some(&'x'));
        assert_eq!(sampler.pick(0.2), Some(&'x'));
        assert_eq!(sampler.pick(0.21), Some(&'y'));
        assert_eq!(sampler.pick(0.99), Some(&'z'));
    }

    #[test]
    fn test_sampler_short_weights_fall_back_to_last() {
        let sampler: WeightedSampler<u8> = [(1, 0.1), (2, 0.1)].into_iter().collect();
        assert_eq!(sampler.pick(0.9), Some(&2));
        assert!((sampler.total_weight() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sampler() {
        let sampler: WeightedSampler<u8> = WeightedSampler::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sampler.is_empty());
        assert_eq!(sampler.sample(&mut rng), None);
    }

    #[test]
    fn test_sampler_converges() {
        let sampler: WeightedSampler<usize> = [(0, 0.2), (1, 0.3), (2, 0.5)].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 3];
        let draws = 100_000;

        for _ in 0..draws {
            counts[*sampler.sample(&mut rng).unwrap()] += 1;
        }

        for (count, expected) in counts.iter().zip([0.2, 0.3, 0.5]) {
            let observed = *count as f64 / draws as f64;
            assert!((observed - expected).abs() < 0.02, "observed {observed}, expected {expected}");
        }
    }

    #[test]
    fn test_table_fills_slots() {
        let table: WeightedTable<char, 10> = WeightedTable::new([('a', 0.3), ('b', 0.5)]).unwrap();
        let slots = table.slots();

        assert_eq!(slots.len(), 10);
        assert_eq!(slots.iter().filter(|c| **c == 'a').count(), 3);
        assert_eq!(slots.iter().filter(|c| **c == 'b').count(), 5);
        assert_eq!(slots.iter().filter(|c| **c == char::default()).count(), 2);
    }

    #[test]
    fn test_table_rejects_excess_total() {
        let result: Result<WeightedTable<u8>, _> = WeightedTable::new([(1, 0.7), (2, 0.6)]);
        assert!(matches!(result, Err(ProbabilityError::TotalExceedsOne { .. })));

        // 0.1 + 0.2 + 0.7 drifts just above 1.0 in binary floating point.
        let ok: Result<WeightedTable<u8>, _> = WeightedTable::new([(1, 0.1), (2, 0.2), (3, 0.7)]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_table_sample_and_shuffle() {
        let mut table: WeightedTable<u8, 4> = WeightedTable::new([(9, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        table.shuffle(&mut rng);
        assert_eq!(table.sample(&mut rng), Some(&9));
        assert!(table.slots().iter().all(|v| *v == 9));
    }
}
