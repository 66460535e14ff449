//! Chain data models.

use super::errors::{ChainError, ChainResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A player taking part in the game
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub email: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// What a single player is told about their assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    #[serde(alias = "target")]
    pub target_name: String,
    pub target_email: String,
    pub player_email: String,
}

/// One edge of the cycle: `player` hunts `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<'a> {
    pub player: &'a Participant,
    pub target: &'a Participant,
}

/// A single cycle over all participants.
///
/// Stored as the shuffled order; every participant targets the one after it
/// and the last one targets the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    cycle: Vec<Participant>,
}

impl Assignment {
    /// Callers must pass at least two participants.
    pub(crate) fn from_cycle(cycle: Vec<Participant>) -> Self {
        debug_assert!(cycle.len() >= 2);
        Self { cycle }
    }

    /// Number of participants in the cycle
    pub fn len(&self) -> usize {
        self.cycle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycle.is_empty()
    }

    /// Participants in cycle order
    pub fn cycle(&self) -> &[Participant] {
        &self.cycle
    }

    /// Iterate over every player → target edge, in cycle order
    pub fn links(&self) -> impl Iterator<Item = Link<'_>> {
        let n = self.cycle.len();
        self.cycle.iter().enumerate().map(move |(i, player)| Link {
            player,
            target: &self.cycle[(i + 1) % n],
        })
    }

    /// Target of the first participant with the given name
    pub fn target_of(&self, name: &str) -> Option<&Participant> {
        self.links()
            .find(|link| link.player.name == name)
            .map(|link| link.target)
    }

    /// Convert into the name-keyed form handed to callers.
    ///
    /// Names are expected to be unique; duplicates collapse into one entry.
    pub fn to_chain(&self) -> Chain {
        self.links()
            .map(|link| {
                (
                    link.player.name.clone(),
                    TargetInfo {
                        target_name: link.target.name.clone(),
                        target_email: link.target.email.clone(),
                        player_email: link.player.email.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Name-keyed assignment as returned to hosts and accepted for delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(BTreeMap<String, TargetInfo>);

impl Chain {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, player: &str) -> Option<&TargetInfo> {
        self.0.get(player)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TargetInfo)> {
        self.0.iter()
    }

    /// Name of the player's target
    pub fn target_of(&self, player: &str) -> Option<&str> {
        self.0.get(player).map(|info| info.target_name.as_str())
    }

    /// Check that the chain is a single cycle over its own players
    ///
    /// # Errors
    ///
    /// * `ChainError::InvalidInput` - Fewer than 2 players
    /// * `ChainError::SelfTarget` - A player targets themselves
    /// * `ChainError::UnknownTarget` - A target is not a player
    /// * `ChainError::DuplicateTarget` - Two players share a target
    /// * `ChainError::BrokenCycle` - The chain splits into shorter cycles
    pub fn validate(&self) -> ChainResult<()> {
        let expected = self.0.len();
        if expected < 2 {
            return Err(ChainError::InvalidInput(expected));
        }

        let mut seen = HashSet::with_capacity(expected);
        for (player, info) in &self.0 {
            if info.target_name == *player {
                return Err(ChainError::SelfTarget(player.clone()));
            }
            if !self.0.contains_key(&info.target_name) {
                return Err(ChainError::UnknownTarget {
                    player: player.clone(),
                    target: info.target_name.clone(),
                });
            }
            if !seen.insert(info.target_name.as_str()) {
                return Err(ChainError::DuplicateTarget(info.target_name.clone()));
            }
        }

        // Targets form a permutation now, so the walk always returns to start.
        let Some(start) = self.0.keys().next() else {
            return Err(ChainError::InvalidInput(0));
        };
        let mut current = start.as_str();
        let mut cycle_len = 0;
        loop {
            current = self.0[current].target_name.as_str();
            cycle_len += 1;
            if current == start {
                break;
            }
        }

        if cycle_len != expected {
            return Err(ChainError::BrokenCycle {
                cycle_len,
                expected,
            });
        }
        Ok(())
    }
}

impl FromIterator<(String, TargetInfo)> for Chain {
    fn from_iter<I: IntoIterator<Item = (String, TargetInfo)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Chain {
    type Item = (String, TargetInfo);
    type IntoIter = std::collections::btree_map::IntoIter<String, TargetInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
