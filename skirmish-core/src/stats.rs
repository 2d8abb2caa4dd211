//! Stat model: closed stat enumeration, the race-bonus table, and the
//! effective-stat computation.
//!
//! Two conventions matter everywhere in this module:
//!
//! - **Inverted goodness for thresholds.** DEF and Hit On are die-roll
//!   thresholds ("roll N or higher"), so *lower* is better and negative
//!   deltas are beneficial. HP and Move read the usual way.
//! - **Effective = base + race bonus + boost delta.** The race table is
//!   configuration, not catalog data, so a different rule set can reshape it
//!   without touching the engine.

use crate::catalog::Character;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Stat kinds
// ============================================================================

/// The closed set of stats the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Ap,
    Move,
    Hp,
    Def,
    #[serde(alias = "hitOn")]
    HitOn,
    Resist,
}

impl StatKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Ap => "AP",
            StatKind::Move => "Move",
            StatKind::Hp => "HP",
            StatKind::Def => "Def",
            StatKind::HitOn => "Hit On",
            StatKind::Resist => "Resist",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Stat boosts
// ============================================================================

/// The one-time, race-gated stat boost a player may assign to a character.
/// Fixed until the character leaves its team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    Move,
    Hp,
    Def,
    #[serde(alias = "hiton")]
    HitOn,
    Resist,
}

impl BoostKind {
    /// Delta contributed to `stat`, zero unless the boost targets that stat.
    pub fn delta(&self, stat: StatKind) -> i32 {
        match (self, stat) {
            (BoostKind::Move, StatKind::Move) => 1,
            (BoostKind::Hp, StatKind::Hp) => 2,
            (BoostKind::Def, StatKind::Def) => -1,
            (BoostKind::HitOn, StatKind::HitOn) => -1,
            _ => 0,
        }
    }

    /// Label shown when the boost is taken.
    pub fn label(&self) -> &'static str {
        match self {
            BoostKind::Move => "Move +1",
            BoostKind::Hp => "HP +2",
            BoostKind::Def => "Def -1",
            BoostKind::HitOn => "Hit On -1",
            BoostKind::Resist => "Resist",
        }
    }
}

impl fmt::Display for BoostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Race bonuses
// ============================================================================

/// Configurable race-bonus table: race name -> stat -> delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceBonuses {
    table: HashMap<String, HashMap<StatKind, i32>>,
}

impl RaceBonuses {
    /// An empty table: no race grants anything.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add or replace a single bonus entry.
    pub fn with_bonus(mut self, race: &str, stat: StatKind, delta: i32) -> Self {
        self.table
            .entry(race.to_string())
            .or_default()
            .insert(stat, delta);
        self
    }

    /// Delta a race grants for a stat; zero for unlisted combinations.
    pub fn bonus(&self, race: &str, stat: StatKind) -> i32 {
        self.table
            .get(race)
            .and_then(|stats| stats.get(&stat))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for RaceBonuses {
    /// The observed rule set. The Dwarf Move bonus is +1: the source
    /// material also showed a -1 next to it in one display, which is treated
    /// as a display defect rather than a stacking rule.
    fn default() -> Self {
        Self::empty()
            .with_bonus("Goliath", StatKind::Hp, 3)
            .with_bonus("Goliath", StatKind::Def, 1)
            .with_bonus("Elf", StatKind::Move, 1)
            .with_bonus("Dwarf", StatKind::Def, 1)
            .with_bonus("Dwarf", StatKind::Move, 1)
    }
}

// ============================================================================
// Effective stats
// ============================================================================

/// A character's unmodified catalog value for a stat.
pub fn base_stat(character: &Character, stat: StatKind) -> i32 {
    match stat {
        StatKind::Ap => character.status.ap as i32,
        StatKind::Move => character.status.movement,
        StatKind::Hp => character.status.hp,
        StatKind::Def => character.status.def,
        StatKind::HitOn => character.attack().hit_on.unwrap_or(0),
        StatKind::Resist => 0,
    }
}

/// Effective stat: base + race bonus + boost delta.
pub fn effective_stat(
    character: &Character,
    boost: Option<BoostKind>,
    races: &RaceBonuses,
    stat: StatKind,
) -> i32 {
    let boost_delta = boost.map(|b| b.delta(stat)).unwrap_or(0);
    base_stat(character, stat) + races.bonus(&character.race, stat) + boost_delta
}

/// Baseline maximum HP: catalog base plus race bonus. Stat boosts are NOT
/// included here; turn resets restore to this value.
pub fn baseline_hp(character: &Character, races: &RaceBonuses) -> u32 {
    (character.status.hp + races.bonus(&character.race, StatKind::Hp)).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CharacterId};

    #[test]
    fn default_race_table_matches_rule_set() {
        let races = RaceBonuses::default();
        assert_eq!(races.bonus("Goliath", StatKind::Hp), 3);
        assert_eq!(races.bonus("Goliath", StatKind::Def), 1);
        assert_eq!(races.bonus("Elf", StatKind::Move), 1);
        assert_eq!(races.bonus("Dwarf", StatKind::Def), 1);
        assert_eq!(races.bonus("Dwarf", StatKind::Move), 1);
        assert_eq!(races.bonus("Human", StatKind::Hp), 0);
        assert_eq!(races.bonus("Goliath", StatKind::Move), 0);
    }

    #[test]
    fn boost_deltas_only_apply_to_their_stat() {
        assert_eq!(BoostKind::Move.delta(StatKind::Move), 1);
        assert_eq!(BoostKind::Hp.delta(StatKind::Hp), 2);
        assert_eq!(BoostKind::Def.delta(StatKind::Def), -1);
        assert_eq!(BoostKind::HitOn.delta(StatKind::HitOn), -1);
        assert_eq!(BoostKind::Hp.delta(StatKind::Move), 0);
        assert_eq!(BoostKind::Resist.delta(StatKind::Def), 0);
    }

    #[test]
    fn goliath_effective_stats_follow_inverted_convention() {
        let catalog = Catalog::sample();
        let karrak = catalog.character(CharacterId(1)).unwrap();
        let races = RaceBonuses::default();

        // HP is plain-good: base 12 + 3.
        assert_eq!(effective_stat(karrak, None, &races, StatKind::Hp), 15);
        // DEF is a threshold: +1 makes Karrak *easier* to hit, and that is
        // exactly what the rule set says a Goliath's bulk does.
        assert_eq!(effective_stat(karrak, None, &races, StatKind::Def), 5);
    }

    #[test]
    fn boost_stacks_with_race_bonus() {
        let catalog = Catalog::sample();
        let alia = catalog.character(CharacterId(4)).unwrap();
        let races = RaceBonuses::default();

        assert_eq!(
            effective_stat(alia, Some(BoostKind::HitOn), &races, StatKind::HitOn),
            2
        );
        assert_eq!(
            effective_stat(alia, Some(BoostKind::HitOn), &races, StatKind::Def),
            5
        );
    }

    #[test]
    fn baseline_hp_excludes_boost() {
        let catalog = Catalog::sample();
        let karrak = catalog.character(CharacterId(1)).unwrap();
        let races = RaceBonuses::default();
        assert_eq!(baseline_hp(karrak, &races), 15);
    }
}
