use std::collections::BTreeSet;

use crate::{Position, map::Dimensions};

/// What the agent has proven about the cave during one episode.
///
/// Every set only ever grows. `safe` is kept a subset of
/// `pit_safe ∩ wumpus_safe`; only `safe` cells may be walked through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    visited: BTreeSet<Position>,
    pit_safe: BTreeSet<Position>,
    wumpus_safe: BTreeSet<Position>,
    safe: BTreeSet<Position>,
    stench_at: BTreeSet<Position>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Fresh knowledge for a new episode: only the home cell is known.
    pub fn new() -> Self {
        let home = BTreeSet::from([Position::HOME]);
        Self {
            visited: home.clone(),
            pit_safe: home.clone(),
            wumpus_safe: home.clone(),
            safe: home,
            stench_at: BTreeSet::new(),
        }
    }

    /// Marks `position` as occupied. Standing there alive proves it free of both hazards.
    pub fn record_visit(&mut self, position: Position) {
        self.visited.insert(position);
        self.pit_safe.insert(position);
        self.wumpus_safe.insert(position);
        self.safe.insert(position);
    }

    pub fn record_stench(&mut self, position: Position) {
        self.stench_at.insert(position);
    }

    /// Applies the two absence rules to the neighbours of `position`.
    ///
    /// No breeze means no neighbour holds a pit; no stench means no neighbour
    /// holds the wumpus. A percept that is present tells us nothing.
    #[tracing::instrument(level = "trace", skip(self, dimensions))]
    pub fn infer(
        &mut self,
        dimensions: &Dimensions,
        position: Position,
        breeze: bool,
        stench: bool,
    ) {
        for neighbor in dimensions.neighbors(position) {
            if !breeze {
                self.pit_safe.insert(neighbor);
            }
            if !stench {
                self.wumpus_safe.insert(neighbor);
            }
            if self.pit_safe.contains(&neighbor) && self.wumpus_safe.contains(&neighbor) {
                self.safe.insert(neighbor);
            }
        }
        tracing::trace!(safe = self.safe.len(), "Knowledge updated");
    }

    /// The wumpus is dead, so every pit-free cell is now fully safe.
    pub fn confirm_wumpus_dead(&mut self) {
        self.wumpus_safe.extend(self.pit_safe.iter().copied());
        self.safe.extend(self.pit_safe.iter().copied());
        tracing::trace!(safe = self.safe.len(), "Wumpus confirmed dead");
    }

    /// Safe cells not yet visited, in ascending `(x, y)` order.
    pub fn safe_unvisited(&self) -> impl Iterator<Item = Position> + '_ {
        self.safe.difference(&self.visited).copied()
    }

    pub fn is_safe(&self, position: Position) -> bool {
        self.safe.contains(&position)
    }

    pub fn is_visited(&self, position: Position) -> bool {
        self.visited.contains(&position)
    }

    pub fn smelled_stench_at(&self, position: Position) -> bool {
        self.stench_at.contains(&position)
    }

    pub fn visited(&self) -> &BTreeSet<Position> {
        &self.visited
    }

    pub fn pit_safe(&self) -> &BTreeSet<Position> {
        &self.pit_safe
    }

    pub fn wumpus_safe(&self) -> &BTreeSet<Position> {
        &self.wumpus_safe
    }

    pub fn safe(&self) -> &BTreeSet<Position> {
        &self.safe
    }

    pub fn stench_at(&self) -> &BTreeSet<Position> {
        &self.stench_at
    }

    /// `safe ⊆ pit_safe ∩ wumpus_safe` and home is safe.
    pub fn is_consistent(&self) -> bool {
        self.safe.contains(&Position::HOME)
            && self
                .safe
                .iter()
                .all(|cell| self.pit_safe.contains(cell) && self.wumpus_safe.contains(cell))
    }
}
