//! Testing utilities: a small deterministic fixture catalog and session
//! builders used by the integration suites.
//!
//! The fixture numbers are chosen so the worked examples in the rule set
//! fall out directly: Rook has 10 HP, 2 AP, a 1-AP attack for 3 damage;
//! Torga's 4-damage attack makes a 6-damage critical.

use crate::catalog::{
    Attack, BaseStatus, Catalog, Character, CharacterId, RaceDefinition, ResistHint, Skill,
    SkillId, StatusBuffDefinition,
};
use crate::session::BattleSession;

/// Character ids in the fixture catalog.
pub const ROOK: CharacterId = CharacterId(1);
pub const GALE: CharacterId = CharacterId(2);
pub const TORGA: CharacterId = CharacterId(3);
pub const WREN: CharacterId = CharacterId(4);
pub const DAIN: CharacterId = CharacterId(5);

/// Skill ids in the fixture catalog.
pub const SHIELD_BASH: SkillId = SkillId(11);
pub const LONG_SHOT: SkillId = SkillId(41);

fn fixture_character(
    id: CharacterId,
    name: &str,
    role: &str,
    race: &str,
    ap: u32,
    hp: i32,
    def: i32,
    attack: Attack,
    skills: Vec<Skill>,
) -> Character {
    Character {
        id,
        name: name.to_string(),
        role: role.to_string(),
        race: race.to_string(),
        class_name: "Fixture".to_string(),
        status: BaseStatus {
            ap,
            movement: 4,
            hp,
            def,
            attack,
        },
        skills,
    }
}

fn fixture_skill(id: SkillId, name: &str, ap_cost: u32) -> Skill {
    Skill {
        id,
        name: name.to_string(),
        ap_cost,
        hit_on: Some(4),
        range: "1".to_string(),
        card: String::new(),
        description: String::new(),
        effects: None,
    }
}

/// A five-character catalog covering every race the default rules care
/// about, plus three status buffs with distinct removal hints.
pub fn fixture_catalog() -> Catalog {
    let characters = vec![
        fixture_character(
            ROOK,
            "Rook",
            "Vanguard",
            "Human",
            2,
            10,
            4,
            Attack {
                ap_cost: 1,
                hit_on: Some(4),
                range: 1,
                damage: 3,
            },
            vec![fixture_skill(SHIELD_BASH, "Shield Bash", 2)],
        ),
        fixture_character(
            GALE,
            "Gale",
            "Skirmisher",
            "Elf",
            3,
            8,
            5,
            Attack {
                ap_cost: 1,
                hit_on: Some(3),
                range: 1,
                damage: 2,
            },
            vec![],
        ),
        fixture_character(
            TORGA,
            "Torga",
            "Warden",
            "Goliath",
            2,
            12,
            4,
            Attack {
                ap_cost: 1,
                hit_on: Some(4),
                range: 1,
                damage: 4,
            },
            vec![],
        ),
        fixture_character(
            WREN,
            "Wren",
            "Sharpshooter",
            "Human",
            2,
            7,
            5,
            Attack {
                ap_cost: 1,
                hit_on: Some(3),
                range: 5,
                damage: 2,
            },
            vec![fixture_skill(LONG_SHOT, "Long Shot", 2)],
        ),
        fixture_character(
            DAIN,
            "Dain",
            "Warden",
            "Dwarf",
            2,
            11,
            4,
            Attack {
                ap_cost: 1,
                hit_on: Some(4),
                range: 1,
                damage: 3,
            },
            vec![],
        ),
    ];

    let races = ["Human", "Elf", "Goliath", "Dwarf"]
        .into_iter()
        .map(|name| RaceDefinition {
            name: name.to_string(),
            description: String::new(),
        })
        .collect();

    let status_buffs = vec![
        StatusBuffDefinition {
            id: crate::catalog::BuffId(1),
            name: "Fearful".to_string(),
            label: "Fearful".to_string(),
            category: "mind".to_string(),
            description: String::new(),
            effects: vec![],
            resist: ResistHint {
                dice: Some(4),
                ap: Some(1),
                turns: Some(2),
            },
        },
        StatusBuffDefinition {
            id: crate::catalog::BuffId(2),
            name: "Frozen".to_string(),
            label: "Frozen".to_string(),
            category: "action".to_string(),
            description: String::new(),
            effects: vec![],
            resist: ResistHint {
                dice: Some(5),
                ap: Some(2),
                turns: Some(1),
            },
        },
        StatusBuffDefinition {
            id: crate::catalog::BuffId(3),
            name: "Bleeding".to_string(),
            label: "Bleeding".to_string(),
            category: "hp".to_string(),
            description: String::new(),
            effects: vec![],
            resist: ResistHint {
                dice: Some(4),
                ap: None,
                turns: Some(3),
            },
        },
    ];

    // Static fixture data; construction cannot fail.
    match Catalog::new(characters, races, status_buffs) {
        Ok(catalog) => catalog,
        Err(error) => panic!("fixture catalog invalid: {error}"),
    }
}

/// A session over the fixture catalog with default rules.
pub fn fixture_session() -> BattleSession {
    BattleSession::new(fixture_catalog())
}
