//! Static character, race, and status-buff catalog.
//!
//! The catalog is loaded once at session start and never mutated. It is the
//! reference data every other module resolves ids against: characters carry
//! their base stats and basic attack, status buffs carry their effect lists
//! and removal hints, races carry descriptive text (the race *bonus table*
//! lives in [`crate::stats::RaceBonuses`], where it is configurable).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for catalog characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a character's skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillId(pub u32);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a status buff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuffId(pub u32);

impl fmt::Display for BuffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Characters
// ============================================================================

/// A character's basic attack profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attack {
    /// AP spent per attack action.
    #[serde(rename = "ap")]
    pub ap_cost: u32,
    /// Die-roll threshold to land the attack ("roll N or higher"); lower is
    /// better. `None` for attacks that never roll.
    #[serde(rename = "hitOn")]
    pub hit_on: Option<i32>,
    /// Range in board units; 1 is melee.
    pub range: u32,
    /// Flat damage dealt on a declared hit.
    pub damage: u32,
}

/// Effect entry attached to a skill card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEffect {
    pub id: u32,
    pub status: String,
    pub value: i32,
    pub target: String,
}

/// A character skill. Damage and effects live on the referenced card; the
/// engine only enforces the AP cost (see the skill-use command).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[serde(rename = "ap")]
    pub ap_cost: u32,
    #[serde(rename = "hitOn")]
    pub hit_on: Option<i32>,
    pub range: String,
    /// Reference to the damage-bearing card art/text.
    pub card: String,
    pub description: String,
    #[serde(rename = "effect", default)]
    pub effects: Option<Vec<SkillEffect>>,
}

/// Base stat block, as shipped in the catalog. The nested attack mirrors the
/// external data shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStatus {
    pub ap: u32,
    #[serde(rename = "move")]
    pub movement: i32,
    pub hp: i32,
    pub def: i32,
    pub attack: Attack,
}

/// An immutable catalog character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub role: String,
    pub race: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub status: BaseStatus,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Character {
    /// Basic attack profile.
    pub fn attack(&self) -> &Attack {
        &self.status.attack
    }

    /// Look up one of this character's skills by id.
    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }
}

// ============================================================================
// Races
// ============================================================================

/// Descriptive race entry. Stat bonuses are configuration, not catalog data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceDefinition {
    pub name: String,
    pub description: String,
}

// ============================================================================
// Status Buffs
// ============================================================================

/// Removal hint carried by a status buff. All fields are optional; none is
/// enforced automatically, and the engine schedules no turn-based expiry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResistHint {
    pub dice: Option<i32>,
    pub ap: Option<u32>,
    #[serde(alias = "turn")]
    pub turns: Option<u32>,
}

/// Effect entry of a status buff, displayed next to the afflicted character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffEffect {
    pub stat: String,
    pub value: i32,
}

/// An immutable status-buff definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBuffDefinition {
    pub id: BuffId,
    /// Canonical (English) name, matched against the disabling set.
    #[serde(alias = "engName")]
    pub name: String,
    /// Localized display label.
    #[serde(alias = "thaiName")]
    pub label: String,
    /// Stat category. The category `"action"` costs 1 AP on affliction.
    #[serde(alias = "stat")]
    pub category: String,
    pub description: String,
    #[serde(alias = "effect", default)]
    pub effects: Vec<BuffEffect>,
    #[serde(default)]
    pub resist: ResistHint,
}

/// Stat category with engine semantics: afflicting a buff of this category
/// immediately reduces the target's AP by 1.
pub const ACTION_CATEGORY: &str = "action";

// ============================================================================
// Catalog
// ============================================================================

/// Errors from catalog construction and ingestion.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate character id {0}")]
    DuplicateCharacter(CharacterId),

    #[error("duplicate status buff id {0}")]
    DuplicateBuff(BuffId),

    #[error("character {character} has unknown race {race:?}")]
    UnknownRace { character: CharacterId, race: String },

    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The read-only reference data for a battle session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    characters: Vec<Character>,
    races: Vec<RaceDefinition>,
    status_buffs: Vec<StatusBuffDefinition>,
}

impl Catalog {
    /// Build a catalog, validating id uniqueness and race references.
    pub fn new(
        characters: Vec<Character>,
        races: Vec<RaceDefinition>,
        status_buffs: Vec<StatusBuffDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for character in &characters {
            if !seen.insert(character.id) {
                return Err(CatalogError::DuplicateCharacter(character.id));
            }
            if !races.iter().any(|r| r.name == character.race) {
                return Err(CatalogError::UnknownRace {
                    character: character.id,
                    race: character.race.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for buff in &status_buffs {
            if !seen.insert(buff.id) {
                return Err(CatalogError::DuplicateBuff(buff.id));
            }
        }

        Ok(Self {
            characters,
            races,
            status_buffs,
        })
    }

    /// Parse a catalog from the three external JSON documents.
    pub fn from_json(
        characters_json: &str,
        races_json: &str,
        status_buffs_json: &str,
    ) -> Result<Self, CatalogError> {
        let characters: Vec<Character> = serde_json::from_str(characters_json)?;
        let races: Vec<RaceDefinition> = serde_json::from_str(races_json)?;
        let status_buffs: Vec<StatusBuffDefinition> = serde_json::from_str(status_buffs_json)?;
        Self::new(characters, races, status_buffs)
    }

    /// The built-in sample roster used by demos and tests.
    pub fn sample() -> Self {
        sample::SAMPLE_CATALOG.clone()
    }

    /// Look up a character by id.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Look up a status buff by id.
    pub fn status_buff(&self, id: BuffId) -> Option<&StatusBuffDefinition> {
        self.status_buffs.iter().find(|b| b.id == id)
    }

    /// Look up a race definition by name.
    pub fn race(&self, name: &str) -> Option<&RaceDefinition> {
        self.races.iter().find(|r| r.name == name)
    }

    /// All characters, in catalog order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// All race definitions.
    pub fn races(&self) -> &[RaceDefinition] {
        &self.races
    }

    /// All status-buff definitions.
    pub fn status_buffs(&self) -> &[StatusBuffDefinition] {
        &self.status_buffs
    }

    /// Display name for an id, falling back to the raw id for strangers.
    pub fn character_name(&self, id: CharacterId) -> String {
        self.character(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

// ============================================================================
// Sample data
// ============================================================================

mod sample {
    use super::*;

    fn character(
        id: u32,
        name: &str,
        role: &str,
        race: &str,
        class_name: &str,
        ap: u32,
        movement: i32,
        hp: i32,
        def: i32,
        attack: Attack,
        skills: Vec<Skill>,
    ) -> Character {
        Character {
            id: CharacterId(id),
            name: name.to_string(),
            role: role.to_string(),
            race: race.to_string(),
            class_name: class_name.to_string(),
            status: BaseStatus {
                ap,
                movement,
                hp,
                def,
                attack,
            },
            skills,
        }
    }

    fn skill(id: u32, name: &str, ap_cost: u32, hit_on: Option<i32>, range: &str) -> Skill {
        Skill {
            id: SkillId(id),
            name: name.to_string(),
            ap_cost,
            hit_on,
            range: range.to_string(),
            card: format!("cards/{}.png", name.to_lowercase().replace(' ', "_")),
            description: String::new(),
            effects: None,
        }
    }

    fn buff(
        id: u32,
        name: &str,
        label: &str,
        category: &str,
        description: &str,
        effects: Vec<BuffEffect>,
        resist: ResistHint,
    ) -> StatusBuffDefinition {
        StatusBuffDefinition {
            id: BuffId(id),
            name: name.to_string(),
            label: label.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            effects,
            resist,
        }
    }

    fn effect(stat: &str, value: i32) -> BuffEffect {
        BuffEffect {
            stat: stat.to_string(),
            value,
        }
    }

    lazy_static::lazy_static! {
        pub(super) static ref SAMPLE_CATALOG: Catalog = Catalog {
            characters: vec![
                character(
                    1, "Karrak", "Vanguard", "Goliath", "Shieldbreaker",
                    2, 4, 12, 4,
                    Attack { ap_cost: 1, hit_on: Some(4), range: 1, damage: 3 },
                    vec![
                        skill(11, "Crushing Blow", 2, Some(3), "1"),
                        skill(12, "Ground Slam", 2, None, "template"),
                    ],
                ),
                character(
                    2, "Seris", "Skirmisher", "Elf", "Blade Dancer",
                    3, 6, 8, 5,
                    Attack { ap_cost: 1, hit_on: Some(3), range: 1, damage: 2 },
                    vec![skill(21, "Twin Fangs", 2, Some(3), "1")],
                ),
                character(
                    3, "Brom", "Warden", "Dwarf", "Stonehide",
                    2, 3, 11, 4,
                    Attack { ap_cost: 1, hit_on: Some(4), range: 1, damage: 3 },
                    vec![skill(31, "Bulwark", 1, None, "self")],
                ),
                character(
                    4, "Alia", "Sharpshooter", "Human", "Longbow",
                    2, 5, 7, 5,
                    Attack { ap_cost: 1, hit_on: Some(3), range: 6, damage: 2 },
                    vec![skill(41, "Piercing Shot", 2, Some(4), "8")],
                ),
                character(
                    5, "Mira", "Support", "Human", "Field Medic",
                    3, 5, 7, 6,
                    Attack { ap_cost: 1, hit_on: Some(5), range: 1, damage: 1 },
                    vec![
                        skill(51, "Mend", 1, None, "2"),
                        skill(52, "Rally", 2, None, "aura"),
                    ],
                ),
                character(
                    6, "Thornag", "Vanguard", "Goliath", "Wrecker",
                    2, 4, 13, 4,
                    Attack { ap_cost: 1, hit_on: Some(4), range: 1, damage: 4 },
                    vec![skill(61, "Overhead Smash", 2, Some(4), "1")],
                ),
                character(
                    7, "Fenwick", "Skirmisher", "Human", "Lancer",
                    2, 6, 9, 5,
                    Attack { ap_cost: 1, hit_on: Some(4), range: 2, damage: 3 },
                    vec![skill(71, "Lunge", 1, Some(4), "2")],
                ),
                character(
                    8, "Ezren", "Sharpshooter", "Elf", "Warden of the Glade",
                    2, 5, 7, 5,
                    Attack { ap_cost: 1, hit_on: Some(3), range: 5, damage: 2 },
                    vec![skill(81, "Volley", 2, Some(5), "template")],
                ),
            ],
            races: vec![
                RaceDefinition {
                    name: "Human".to_string(),
                    description: "Adaptable and ambitious; may choose a one-time stat boost."
                        .to_string(),
                },
                RaceDefinition {
                    name: "Goliath".to_string(),
                    description: "Towering and tough; harder to wound and harder to bring down."
                        .to_string(),
                },
                RaceDefinition {
                    name: "Elf".to_string(),
                    description: "Swift and sure-footed across any terrain.".to_string(),
                },
                RaceDefinition {
                    name: "Dwarf".to_string(),
                    description: "Stubborn, steady, and very hard to move when braced."
                        .to_string(),
                },
            ],
            status_buffs: vec![
                buff(
                    1, "Fearful", "Fearful", "mind",
                    "Too shaken to attack until the fear is shaken off.",
                    vec![effect("hitOn", 1)],
                    ResistHint { dice: Some(4), ap: Some(1), turns: Some(2) },
                ),
                buff(
                    2, "Frozen", "Frozen", "action",
                    "Locked in ice; acting at all costs extra effort.",
                    vec![effect("ap", -1), effect("move", -2)],
                    ResistHint { dice: Some(5), ap: Some(2), turns: Some(1) },
                ),
                buff(
                    3, "Prone", "Prone", "move",
                    "Knocked down; cannot attack until back on their feet.",
                    vec![effect("move", -2)],
                    ResistHint { dice: None, ap: Some(1), turns: None },
                ),
                buff(
                    4, "Bleeding", "Bleeding", "hp",
                    "An open wound that saps strength each round.",
                    vec![effect("hp", -1)],
                    ResistHint { dice: Some(4), ap: None, turns: Some(3) },
                ),
                buff(
                    5, "Shielded", "Shielded", "def",
                    "Braced behind a raised guard.",
                    vec![effect("def", -1)],
                    ResistHint::default(),
                ),
                buff(
                    6, "Dazed", "Dazed", "action",
                    "Seeing double; every swing lands wide.",
                    vec![effect("hitOn", 1)],
                    ResistHint { dice: Some(3), ap: Some(1), turns: Some(1) },
                ),
            ],
        };
    }
}
