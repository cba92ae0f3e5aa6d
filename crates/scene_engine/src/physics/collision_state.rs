//! Collision state and its per-tick difference
//!
//! The state is the ordered set of directed collider pairs that touched in
//! one physics tick. Comparing two consecutive states yields the pairs that
//! started touching (additions) and the ones that stopped (removals).

use std::collections::HashSet;

use crate::foundation::collections::ComponentId;

/// Directed pair of collider components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Collider whose owner receives the event
    pub collider: ComponentId,
    /// Collider it touched
    pub other: ComponentId,
}

impl CollisionPair {
    /// Create a pair
    pub fn new(collider: ComponentId, other: ComponentId) -> Self {
        Self { collider, other }
    }

    /// The pair seen from the other side
    pub fn reversed(self) -> Self {
        Self { collider: self.other, other: self.collider }
    }
}

/// Ordered set of pairs touching during one tick
#[derive(Debug, Clone, Default)]
pub struct CollisionState {
    pairs: Vec<CollisionPair>,
    index: HashSet<CollisionPair>,
}

impl CollisionState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair; returns false when it was already present
    pub fn insert(&mut self, pair: CollisionPair) -> bool {
        if self.index.insert(pair) {
            self.pairs.push(pair);
            true
        } else {
            false
        }
    }

    /// Whether the pair is present
    pub fn contains(&self, pair: &CollisionPair) -> bool {
        self.index.contains(pair)
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the state is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CollisionPair> {
        self.pairs.iter()
    }

    /// Remove every pair
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.index.clear();
    }
}

impl FromIterator<CollisionPair> for CollisionState {
    fn from_iter<I: IntoIterator<Item = CollisionPair>>(iter: I) -> Self {
        let mut state = Self::new();
        for pair in iter {
            state.insert(pair);
        }
        state
    }
}

/// Whether a pair started or stopped touching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Present now, absent before
    Addition,
    /// Present before, absent now
    Removal,
}

/// One change between two states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiffEntry {
    /// The pair that changed
    pub pair: CollisionPair,
    /// How it changed
    pub kind: DiffKind,
}

/// Changes between two consecutive states
///
/// Removals come first in the old state's order, then additions in the new
/// state's order. No entry appears twice.
#[derive(Debug, Clone, Default)]
pub struct CollisionStateDiff {
    entries: Vec<DiffEntry>,
}

impl CollisionStateDiff {
    /// Compare `old` against `new`
    pub fn between(old: &CollisionState, new: &CollisionState) -> Self {
        let removals = old
            .iter()
            .filter(|pair| !new.contains(pair))
            .map(|&pair| DiffEntry { pair, kind: DiffKind::Removal });
        let additions = new
            .iter()
            .filter(|pair| !old.contains(pair))
            .map(|&pair| DiffEntry { pair, kind: DiffKind::Addition });

        Self { entries: removals.chain(additions).collect() }
    }

    /// Entries in dispatch order
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Pairs that started touching
    pub fn additions(&self) -> impl Iterator<Item = &CollisionPair> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == DiffKind::Addition)
            .map(|entry| &entry.pair)
    }

    /// Pairs that stopped touching
    pub fn removals(&self) -> impl Iterator<Item = &CollisionPair> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == DiffKind::Removal)
            .map(|entry| &entry.pair)
    }

    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
