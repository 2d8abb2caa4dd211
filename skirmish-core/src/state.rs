//! Mutable battle state: team rosters, the per-character resource table,
//! stat-boost assignments, active statuses, and the turn counter.
//!
//! Everything here is plain data with narrow mutators. Game rules live in
//! [`crate::rules`]; nothing in this module validates a command, it only
//! applies already-resolved changes.

use crate::catalog::{BuffId, Catalog, CharacterId};
use crate::stats::{self, BoostKind, RaceBonuses};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Teams
// ============================================================================

/// One of the two sides of a skirmish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn name(&self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
        }
    }

    pub fn other(&self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Team membership. A character belongs to at most one team; inserting into
/// one side removes it from the other.
#[derive(Debug, Clone, Default)]
pub struct Rosters {
    team_a: Vec<CharacterId>,
    team_b: Vec<CharacterId>,
    assignment: HashMap<CharacterId, Team>,
}

impl Rosters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of a team, in join order.
    pub fn members(&self, team: Team) -> &[CharacterId] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    fn members_mut(&mut self, team: Team) -> &mut Vec<CharacterId> {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    /// The team a character is currently assigned to, if any.
    pub fn assignment(&self, id: CharacterId) -> Option<Team> {
        self.assignment.get(&id).copied()
    }

    /// Add a character to a team, pulling it off the other side first.
    /// Idempotent: re-adding to the same team changes nothing.
    pub fn insert(&mut self, id: CharacterId, team: Team) {
        let other = self.members_mut(team.other());
        other.retain(|&member| member != id);

        let members = self.members_mut(team);
        if !members.contains(&id) {
            members.push(id);
        }
        self.assignment.insert(id, team);
    }

    /// Remove a character from a team and clear its assignment.
    pub fn remove(&mut self, id: CharacterId, team: Team) {
        self.members_mut(team).retain(|&member| member != id);
        self.assignment.remove(&id);
    }

    /// Empty both teams and all assignments.
    pub fn clear(&mut self) {
        self.team_a.clear();
        self.team_b.clear();
        self.assignment.clear();
    }

    /// Whether the character is on either team.
    pub fn is_assigned(&self, id: CharacterId) -> bool {
        self.assignment.contains_key(&id)
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Current HP and AP for one character. Both are unsigned: the clamping
/// invariant (never below zero) is enforced by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEntry {
    pub hp: u32,
    pub ap: u32,
}

/// Current resources, with a guaranteed entry for every catalog character
/// from construction time, so no read site needs a fallback default.
#[derive(Debug, Clone)]
pub struct ResourceTable {
    entries: HashMap<CharacterId, ResourceEntry>,
}

impl ResourceTable {
    /// Seed from the catalog: HP at catalog base plus race bonus, AP at
    /// catalog base.
    pub fn seed(catalog: &Catalog, races: &RaceBonuses) -> Self {
        let entries = catalog
            .characters()
            .iter()
            .map(|c| {
                (
                    c.id,
                    ResourceEntry {
                        hp: stats::baseline_hp(c, races),
                        ap: c.status.ap,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: CharacterId) -> Option<ResourceEntry> {
        self.entries.get(&id).copied()
    }

    pub fn hp(&self, id: CharacterId) -> Option<u32> {
        self.entries.get(&id).map(|e| e.hp)
    }

    pub fn ap(&self, id: CharacterId) -> Option<u32> {
        self.entries.get(&id).map(|e| e.ap)
    }

    /// Reduce HP, flooring at zero. No-op for untracked ids.
    pub fn apply_damage(&mut self, id: CharacterId, damage: u32) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.hp = entry.hp.saturating_sub(damage);
        }
    }

    /// Reduce AP, flooring at zero. No-op for untracked ids.
    pub fn spend_ap(&mut self, id: CharacterId, amount: u32) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.ap = entry.ap.saturating_sub(amount);
        }
    }

    /// Set HP directly. Callers may exceed the computed baseline; the table
    /// does not impose an upper bound.
    pub fn set_hp(&mut self, id: CharacterId, hp: u32) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.hp = hp;
        }
    }

    /// Set AP directly.
    pub fn set_ap(&mut self, id: CharacterId, ap: u32) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.ap = ap;
        }
    }

    /// Iterate over all tracked entries.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, ResourceEntry)> + '_ {
        self.entries.iter().map(|(&id, &entry)| (id, entry))
    }
}

// ============================================================================
// Active statuses
// ============================================================================

/// Active status buffs per character: insertion-ordered for display,
/// set-semantic (no duplicates).
#[derive(Debug, Clone, Default)]
pub struct ActiveStatuses {
    map: HashMap<CharacterId, Vec<BuffId>>,
}

impl ActiveStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a buff. Returns false if it was already active.
    pub fn add(&mut self, id: CharacterId, buff: BuffId) -> bool {
        let buffs = self.map.entry(id).or_default();
        if buffs.contains(&buff) {
            return false;
        }
        buffs.push(buff);
        true
    }

    /// Remove a buff. Returns false if it was not active.
    pub fn remove(&mut self, id: CharacterId, buff: BuffId) -> bool {
        match self.map.get_mut(&id) {
            Some(buffs) if buffs.contains(&buff) => {
                buffs.retain(|&b| b != buff);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: CharacterId, buff: BuffId) -> bool {
        self.map.get(&id).is_some_and(|buffs| buffs.contains(&buff))
    }

    /// Active buffs for a character, in application order.
    pub fn for_character(&self, id: CharacterId) -> &[BuffId] {
        self.map.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every buff on a character.
    pub fn clear_for(&mut self, id: CharacterId) {
        self.map.remove(&id);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

// ============================================================================
// Turn state
// ============================================================================

/// Turn counter plus the per-turn attack-attempt tally used for the
/// escalating hit bonus. Attempts are cleared on every turn-number change.
#[derive(Debug, Clone)]
pub struct TurnState {
    number: u32,
    attack_attempts: HashMap<CharacterId, u32>,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            number: 1,
            attack_attempts: HashMap::new(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Advance to the next turn, dropping the attempt tally.
    pub fn advance(&mut self) {
        self.number += 1;
        self.attack_attempts.clear();
    }

    /// Back to turn 1, dropping the attempt tally.
    pub fn reset(&mut self) {
        self.number = 1;
        self.attack_attempts.clear();
    }

    /// Record one attack attempt for this turn.
    pub fn record_attempt(&mut self, id: CharacterId) {
        *self.attack_attempts.entry(id).or_insert(0) += 1;
    }

    /// Attempts recorded for a character this turn.
    pub fn attempts(&self, id: CharacterId) -> u32 {
        self.attack_attempts.get(&id).copied().unwrap_or(0)
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Battle state
// ============================================================================

/// The complete mutable state of one battle session.
#[derive(Debug, Clone)]
pub struct BattleState {
    pub rosters: Rosters,
    pub resources: ResourceTable,
    pub boosts: HashMap<CharacterId, BoostKind>,
    pub statuses: ActiveStatuses,
    pub turn: TurnState,
}

impl BattleState {
    /// Fresh state seeded from the catalog.
    pub fn new(catalog: &Catalog, races: &RaceBonuses) -> Self {
        Self {
            rosters: Rosters::new(),
            resources: ResourceTable::seed(catalog, races),
            boosts: HashMap::new(),
            statuses: ActiveStatuses::new(),
            turn: TurnState::new(),
        }
    }
}
