//! Turn and combat state engine for a tabletop skirmish companion.
//!
//! This crate provides:
//! - Team rosters over a static character catalog
//! - Per-character HP/AP tracking with stat boosts and status effects
//! - Declared-outcome attack resolution (the table rolls, the engine tracks)
//! - Turn lifecycle with end-of-turn AP refresh and full combat reset
//! - A transient notification log every operation reports into
//!
//! # Quick Start
//!
//! ```
//! use skirmish_core::{AttackModifiers, AttackOutcome, BattleSession, Catalog, CharacterId, Team};
//!
//! let mut session = BattleSession::new(Catalog::sample());
//!
//! session.add_to_team(CharacterId(1), Team::A);
//! session.add_to_team(CharacterId(2), Team::B);
//!
//! session.perform_attack(
//!     CharacterId(1),
//!     CharacterId(2),
//!     AttackOutcome::Hit,
//!     AttackModifiers::default(),
//! );
//!
//! for notification in session.notifications() {
//!     println!("[{}] {}", notification.severity, notification.message);
//! }
//!
//! session.end_turn();
//! assert_eq!(session.turn_number(), 2);
//! ```

pub mod catalog;
pub mod notify;
pub mod rules;
pub mod session;
pub mod state;
pub mod stats;
pub mod testing;

// Primary public API
pub use catalog::{
    Attack, BuffId, Catalog, CatalogError, Character, CharacterId, RaceDefinition, ResistHint,
    Skill, SkillId, StatusBuffDefinition,
};
pub use notify::{Notification, NotificationId, NotificationLog, Severity};
pub use rules::{
    AttackModifiers, AttackOutcome, Command, CriticalApCost, Effect, Resolution, RuleConfig,
    RulesEngine,
};
pub use session::{BattleSession, BattleSnapshot, CharacterRow};
pub use state::{BattleState, Team};
pub use stats::{BoostKind, RaceBonuses, StatKind};
