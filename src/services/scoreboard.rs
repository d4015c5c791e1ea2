use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::Team;

/// Ordered team names plus a name -> position index kept in step with it.
#[derive(Debug, Default, Clone)]
pub struct Scoreboard {
    order: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Zero-based position of a team.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// One-based rank of a team.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.position(name).map(|index| index + 1)
    }

    /// Adds a team keeping the board in name order, the layout used before the first flush.
    pub fn insert_by_name(&mut self, name: &str) {
        let index = self
            .order
            .partition_point(|existing| existing.as_str() < name);
        self.order.insert(index, name.to_string());
        self.reindex_from(index);
    }

    /// Rebuilds the whole order from the team comparator.
    pub fn flush(&mut self, teams: &BTreeMap<String, Team>) {
        let mut ranked: Vec<&Team> = teams.values().collect();
        ranked.sort();
        self.order = ranked.into_iter().map(|team| team.name.clone()).collect();
        self.reindex_from(0);
        debug!("Scoreboard flushed with {} teams", self.order.len());
    }

    /// Moves a team upward, one adjacent swap at a time, while it beats the team
    /// above it. Every other team must already be in comparator order.
    /// Returns the old and new positions when the team moved.
    pub fn promote(&mut self, name: &str, teams: &BTreeMap<String, Team>) -> Option<(usize, usize)> {
        let old_index = self.position(name)?;
        let team = teams.get(name)?;

        let mut index = old_index;
        while index > 0 {
            let above = &self.order[index - 1];
            let beats_above = teams.get(above).is_some_and(|other| team < other);
            if !beats_above {
                break;
            }
            self.order.swap(index - 1, index);
            self.positions.insert(self.order[index].clone(), index);
            index -= 1;
        }

        if index == old_index {
            return None;
        }
        self.positions.insert(name.to_string(), index);
        Some((old_index, index))
    }

    fn reindex_from(&mut self, start: usize) {
        for (index, name) in self.order.iter().enumerate().skip(start) {
            self.positions.insert(name.clone(), index);
        }
    }
}
