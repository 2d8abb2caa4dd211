//! Rules engine with a command/effect pipeline.
//!
//! The pipeline keeps game mechanics deterministic and testable:
//! 1. The view layer submits a [`Command`] (what someone wants to do).
//! 2. [`RulesEngine::resolve`] validates it against read-only state and
//!    produces a [`Resolution`]: concrete [`Effect`]s plus user-facing
//!    [`Notice`]s.
//! 3. [`apply_effects`] applies the effects to the [`BattleState`].
//!
//! Validation is complete before any effect is produced, so a failing
//! command is a no-op apart from its error notice. Resolution never panics
//! and never returns an error across the public surface.

use crate::catalog::{BuffId, Catalog, Character, CharacterId, SkillId, ACTION_CATEGORY};
use crate::notify::{Severity, DEFAULT_TTL};
use crate::state::{BattleState, Team};
use crate::stats::{self, BoostKind, RaceBonuses, StatKind};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Tuning constants
// ============================================================================

/// Added to the displayed hit threshold when a ranged attacker fights in
/// melee. Only offerable when the attacker's range exceeds 1.
pub const MELEE_HIT_BONUS: i32 = 4;

/// Subtracted from the displayed hit threshold when ganging up on a target.
pub const GANG_UP_HIT_DELTA: i32 = 2;

/// Subtracted from the displayed defense threshold of a target in light
/// cover.
pub const LIGHT_COVER_DEF_DELTA: i32 = 2;

/// Added to the displayed hit threshold per attack already attempted this
/// turn.
pub const ATTEMPT_HIT_DELTA: i32 = 2;

/// Flat damage added to a critical hit when the role-restricted bonus flag
/// is active.
pub const CRITICAL_ROLE_BONUS: u32 = 1;

/// Critical damage: one-and-a-half times the base, rounded up.
pub fn critical_damage(base: u32) -> u32 {
    (base * 3).div_ceil(2)
}

/// Whether the melee-range bonus may be offered for this attacker at all.
pub fn melee_bonus_available(character: &Character) -> bool {
    character.attack().range > 1
}

// ============================================================================
// Configuration
// ============================================================================

/// How much AP a critical attack costs. One observed code path spent the
/// cost twice; that behavior is preserved as an explicit option instead of
/// an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CriticalApCost {
    /// Critical attacks cost the same as a basic attack.
    #[default]
    Standard,
    /// Critical attacks cost twice the basic attack.
    Double,
}

impl CriticalApCost {
    pub fn multiplier(&self) -> u32 {
        match self {
            CriticalApCost::Standard => 1,
            CriticalApCost::Double => 2,
        }
    }
}

/// Policy knobs for a battle session.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Race -> stat -> delta table used for effective stats and HP seeding.
    pub race_bonuses: RaceBonuses,
    /// Races allowed to take the one-time stat boost.
    pub boost_races: Vec<String>,
    /// Roles allowed the +1 critical damage bonus flag.
    pub damage_bonus_roles: Vec<String>,
    /// Canonical buff names that disable the attack action while active.
    pub disabling_buffs: Vec<String>,
    /// AP cost policy for critical attacks.
    pub critical_ap_cost: CriticalApCost,
    /// Lifetime of a notification before it is swept.
    pub notification_ttl: Duration,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            race_bonuses: RaceBonuses::default(),
            boost_races: vec!["Human".to_string()],
            damage_bonus_roles: vec!["Vanguard".to_string()],
            disabling_buffs: vec![
                "fearful".to_string(),
                "frozen".to_string(),
                "prone".to_string(),
            ],
            critical_ap_cost: CriticalApCost::default(),
            notification_ttl: DEFAULT_TTL,
        }
    }
}

impl RuleConfig {
    pub fn with_race_bonuses(mut self, races: RaceBonuses) -> Self {
        self.race_bonuses = races;
        self
    }

    pub fn with_boost_races(mut self, races: Vec<String>) -> Self {
        self.boost_races = races;
        self
    }

    pub fn with_damage_bonus_roles(mut self, roles: Vec<String>) -> Self {
        self.damage_bonus_roles = roles;
        self
    }

    pub fn with_disabling_buffs(mut self, names: Vec<String>) -> Self {
        self.disabling_buffs = names;
        self
    }

    pub fn with_critical_ap_cost(mut self, policy: CriticalApCost) -> Self {
        self.critical_ap_cost = policy;
        self
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }

    pub fn race_may_boost(&self, race: &str) -> bool {
        self.boost_races.iter().any(|r| r == race)
    }

    pub fn role_has_damage_bonus(&self, role: &str) -> bool {
        self.damage_bonus_roles.iter().any(|r| r == role)
    }

    pub fn buff_disables_attack(&self, name: &str) -> bool {
        self.disabling_buffs
            .iter()
            .any(|n| n.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Declared outcome of an attack action. The table owner rolls physical
/// dice and tells the tracker what happened; the engine never rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Hit,
    Miss,
    Critical,
    CounterHit,
    CounterCritical,
    CounterMiss,
}

impl AttackOutcome {
    /// Counter outcomes reverse attacker and defender for damage purposes
    /// and never cost the counterer AP.
    pub fn is_counter(&self) -> bool {
        matches!(
            self,
            AttackOutcome::CounterHit | AttackOutcome::CounterCritical | AttackOutcome::CounterMiss
        )
    }
}

/// Transient, per-action modifier flags selected in the battle panel. The
/// melee/gang-up/cover flags change only the displayed prospective numbers;
/// free_action and damage_bonus change rules behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackModifiers {
    pub melee: bool,
    pub gang_up: bool,
    pub light_cover: bool,
    pub free_action: bool,
    pub damage_bonus: bool,
}

/// Everything the view can ask the engine to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    AddToTeam {
        id: CharacterId,
        team: Team,
    },
    RemoveFromTeam {
        id: CharacterId,
        team: Team,
    },
    AddRandomCharacters {
        count: usize,
        team: Team,
    },
    ResetTeams,
    ReduceAp {
        id: CharacterId,
        amount: u32,
    },
    ApplyDamage {
        id: CharacterId,
        damage: u32,
    },
    /// Damage without a notification, for callers that emit their own
    /// summary message.
    ApplyDamageQuiet {
        id: CharacterId,
        damage: u32,
    },
    ResetHp {
        id: CharacterId,
    },
    AdjustHp {
        id: CharacterId,
        hp: i32,
    },
    SkipTurn {
        id: CharacterId,
    },
    ApplyStatBoost {
        id: CharacterId,
        boost: BoostKind,
    },
    AddStatusBuff {
        id: CharacterId,
        buff: BuffId,
    },
    RemoveStatusBuff {
        id: CharacterId,
        buff: BuffId,
    },
    /// Spend the buff's resist AP cost and remove it in one step. Blocked
    /// when the character cannot afford the cost.
    RemoveStatusBuffWithResist {
        id: CharacterId,
        buff: BuffId,
    },
    Attack {
        attacker: CharacterId,
        defender: CharacterId,
        outcome: AttackOutcome,
        modifiers: AttackModifiers,
    },
    UseSkill {
        attacker: CharacterId,
        defender: CharacterId,
        skill: SkillId,
    },
    EndTurn,
    ResetTurn,
}

// ============================================================================
// Effects and resolutions
// ============================================================================

/// A concrete state change produced by resolving a command. Applying an
/// effect is mechanical; all decisions were made during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    AddedToTeam { id: CharacterId, team: Team },
    RemovedFromTeam { id: CharacterId, team: Team },
    TeamsCleared,
    DamageApplied { id: CharacterId, amount: u32 },
    ApSpent { id: CharacterId, amount: u32 },
    HpSet { id: CharacterId, hp: u32 },
    ApSet { id: CharacterId, ap: u32 },
    BoostAssigned { id: CharacterId, boost: BoostKind },
    BoostCleared { id: CharacterId },
    BuffAdded { id: CharacterId, buff: BuffId },
    BuffRemoved { id: CharacterId, buff: BuffId },
    StatusesCleared { id: CharacterId },
    AttemptRecorded { id: CharacterId },
    TurnAdvanced,
    TurnReset,
}

/// A user-facing message attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// The outcome of resolving one command.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub notices: Vec<Notice>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolution that only reports an error; no state changes.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new().with_notice(Severity::Error, message)
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_notice(mut self, severity: Severity, message: impl Into<String>) -> Self {
        self.notices.push(Notice {
            severity,
            message: message.into(),
        });
        self
    }
}

// ============================================================================
// Prospective numbers (display only)
// ============================================================================

/// The hit threshold shown in the battle panel for a pending action:
/// effective Hit On, melee and gang-up flags, plus the escalation from
/// attempts already made this turn. Never feeds damage math.
pub fn prospective_hit(effective_hit_on: i32, attempts: u32, mods: AttackModifiers) -> i32 {
    let mut value = effective_hit_on;
    if mods.melee {
        value += MELEE_HIT_BONUS;
    }
    value += attempts as i32 * ATTEMPT_HIT_DELTA;
    if mods.gang_up {
        value -= GANG_UP_HIT_DELTA;
    }
    value
}

/// The defense threshold shown for the pending action's target.
pub fn prospective_defense(effective_def: i32, mods: AttackModifiers) -> i32 {
    let mut value = effective_def;
    if mods.light_cover {
        value -= LIGHT_COVER_DEF_DELTA;
    }
    value
}

// ============================================================================
// Engine
// ============================================================================

/// Resolves commands into effects and notices.
#[derive(Debug, Default)]
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a command against read-only state. Total: every failure is
    /// reported as an error notice with no effects.
    pub fn resolve(
        &self,
        catalog: &Catalog,
        config: &RuleConfig,
        state: &BattleState,
        command: Command,
    ) -> Resolution {
        match command {
            Command::AddToTeam { id, team } => self.resolve_add_to_team(catalog, id, team),
            Command::RemoveFromTeam { id, team } => {
                self.resolve_remove_from_team(catalog, id, team)
            }
            Command::AddRandomCharacters { count, team } => {
                self.resolve_add_random(catalog, state, count, team)
            }
            Command::ResetTeams => self.resolve_reset_teams(catalog, config),
            Command::ReduceAp { id, amount } => self.resolve_reduce_ap(catalog, id, amount),
            Command::ApplyDamage { id, damage } => {
                self.resolve_apply_damage(catalog, state, id, damage)
            }
            Command::ApplyDamageQuiet { id, damage } => {
                self.resolve_apply_damage_quiet(catalog, id, damage)
            }
            Command::ResetHp { id } => self.resolve_reset_hp(catalog, config, state, id),
            Command::AdjustHp { id, hp } => self.resolve_adjust_hp(catalog, state, id, hp),
            Command::SkipTurn { id } => self.resolve_skip_turn(catalog, state, id),
            Command::ApplyStatBoost { id, boost } => {
                self.resolve_stat_boost(catalog, config, state, id, boost)
            }
            Command::AddStatusBuff { id, buff } => {
                self.resolve_add_status(catalog, state, id, buff)
            }
            Command::RemoveStatusBuff { id, buff } => {
                self.resolve_remove_status(catalog, state, id, buff)
            }
            Command::RemoveStatusBuffWithResist { id, buff } => {
                self.resolve_remove_status_with_resist(catalog, state, id, buff)
            }
            Command::Attack {
                attacker,
                defender,
                outcome,
                modifiers,
            } => self.resolve_attack(catalog, config, state, attacker, defender, outcome, modifiers),
            Command::UseSkill {
                attacker,
                defender,
                skill,
            } => self.resolve_use_skill(catalog, state, attacker, defender, skill),
            Command::EndTurn => self.resolve_end_turn(catalog, state),
            Command::ResetTurn => self.resolve_reset_turn(catalog, config),
        }
    }

    fn resolve_add_to_team(&self, catalog: &Catalog, id: CharacterId, team: Team) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };

        Resolution::new()
            .with_effect(Effect::AddedToTeam { id, team })
            .with_notice(
                Severity::Success,
                format!("{} joins Team {team}", character.name),
            )
    }

    fn resolve_remove_from_team(
        &self,
        catalog: &Catalog,
        id: CharacterId,
        team: Team,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };

        // Leaving a team is a soft reset of battle-specific state: the stat
        // boost and active statuses go, HP and AP stay.
        Resolution::new()
            .with_effect(Effect::RemovedFromTeam { id, team })
            .with_effect(Effect::BoostCleared { id })
            .with_effect(Effect::StatusesCleared { id })
            .with_notice(
                Severity::Info,
                format!("{} leaves Team {team}", character.name),
            )
    }

    fn resolve_add_random(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        count: usize,
        team: Team,
    ) -> Resolution {
        let available: Vec<&Character> = catalog
            .characters()
            .iter()
            .filter(|c| !state.rosters.is_assigned(c.id))
            .collect();

        if available.is_empty() {
            return Resolution::error("No unassigned characters left to draw from");
        }

        let n = count.min(available.len());
        let chosen: Vec<&Character> = available
            .choose_multiple(&mut rand::thread_rng(), n)
            .copied()
            .collect();

        let names: Vec<&str> = chosen.iter().map(|c| c.name.as_str()).collect();
        let mut resolution = Resolution::new();
        for character in &chosen {
            resolution = resolution.with_effect(Effect::AddedToTeam {
                id: character.id,
                team,
            });
        }
        resolution.with_notice(
            Severity::Success,
            format!(
                "Drew {n} character{} into Team {team}: {}",
                if n == 1 { "" } else { "s" },
                names.join(", ")
            ),
        )
    }

    fn resolve_reset_teams(&self, catalog: &Catalog, config: &RuleConfig) -> Resolution {
        let mut resolution = Resolution::new().with_effect(Effect::TeamsCleared);
        for character in catalog.characters() {
            resolution = resolution
                .with_effect(Effect::HpSet {
                    id: character.id,
                    hp: stats::baseline_hp(character, &config.race_bonuses),
                })
                .with_effect(Effect::ApSet {
                    id: character.id,
                    ap: character.status.ap,
                });
        }
        resolution.with_notice(Severity::Info, "Teams cleared and resources restored")
    }

    fn resolve_reduce_ap(&self, catalog: &Catalog, id: CharacterId, amount: u32) -> Resolution {
        if catalog.character(id).is_none() {
            return Resolution::new();
        }
        Resolution::new().with_effect(Effect::ApSpent { id, amount })
    }

    fn resolve_apply_damage_quiet(
        &self,
        catalog: &Catalog,
        id: CharacterId,
        damage: u32,
    ) -> Resolution {
        if catalog.character(id).is_none() {
            return Resolution::new();
        }
        Resolution::new().with_effect(Effect::DamageApplied { id, amount: damage })
    }

    fn resolve_apply_damage(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        id: CharacterId,
        damage: u32,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };

        let hp_after = state.resources.hp(id).unwrap_or(0).saturating_sub(damage);
        Resolution::new()
            .with_effect(Effect::DamageApplied { id, amount: damage })
            .with_notice(
                Severity::Info,
                format!("{} takes {damage} damage (HP: {hp_after})", character.name),
            )
    }

    fn resolve_reset_hp(
        &self,
        catalog: &Catalog,
        config: &RuleConfig,
        state: &BattleState,
        id: CharacterId,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} to reset HP for"));
        };

        let mut hp = stats::baseline_hp(character, &config.race_bonuses);
        if let Some(boost) = state.boosts.get(&id) {
            let delta = boost.delta(StatKind::Hp);
            if delta > 0 {
                hp += delta as u32;
            }
        }

        Resolution::new()
            .with_effect(Effect::HpSet { id, hp })
            .with_notice(Severity::Info, format!("Restored {}'s HP", character.name))
    }

    fn resolve_adjust_hp(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        id: CharacterId,
        hp: i32,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };

        let clamped = hp.max(0) as u32;
        let old = state.resources.hp(id).unwrap_or(0);
        let resolution = Resolution::new().with_effect(Effect::HpSet { id, hp: clamped });
        if old == clamped {
            return resolution;
        }
        resolution.with_notice(
            Severity::Info,
            format!("Adjusted {}'s HP: {old} -> {clamped}", character.name),
        )
    }

    fn resolve_skip_turn(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        id: CharacterId,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };

        let ap = state.resources.ap(id).unwrap_or(0);
        if ap == 0 {
            return Resolution::new().with_notice(
                Severity::Info,
                format!("{} has no AP left", character.name),
            );
        }

        Resolution::new()
            .with_effect(Effect::ApSet { id, ap: 0 })
            .with_notice(
                Severity::Info,
                format!("{} skips the rest of the turn (AP set to 0)", character.name),
            )
    }

    fn resolve_stat_boost(
        &self,
        catalog: &Catalog,
        config: &RuleConfig,
        state: &BattleState,
        id: CharacterId,
        boost: BoostKind,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };

        if !config.race_may_boost(&character.race) {
            return Resolution::error(format!("{} cannot take a stat boost", character.name));
        }

        if state.boosts.contains_key(&id) {
            return Resolution::new().with_notice(
                Severity::Info,
                format!("{} already has a stat boost", character.name),
            );
        }

        let mut resolution = Resolution::new().with_effect(Effect::BoostAssigned { id, boost });

        // An HP boost raises current HP immediately; the other boosts only
        // change derived numbers.
        let hp_delta = boost.delta(StatKind::Hp);
        if hp_delta > 0 {
            let hp = state.resources.hp(id).unwrap_or(0) + hp_delta as u32;
            resolution = resolution.with_effect(Effect::HpSet { id, hp });
        }

        resolution.with_notice(
            Severity::Success,
            format!("{} gains {}", character.name, boost.label()),
        )
    }

    fn resolve_add_status(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        id: CharacterId,
        buff_id: BuffId,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };
        let Some(buff) = catalog.status_buff(buff_id) else {
            return Resolution::error(format!("No status buff with id {buff_id}"));
        };

        if state.statuses.contains(id, buff_id) {
            return Resolution::new().with_notice(
                Severity::Info,
                format!("{} is already {}", character.name, buff.label),
            );
        }

        let mut resolution = Resolution::new().with_effect(Effect::BuffAdded { id, buff: buff_id });
        if buff.category == ACTION_CATEGORY {
            resolution = resolution.with_effect(Effect::ApSpent { id, amount: 1 });
        }

        resolution.with_notice(
            Severity::Success,
            format!("{} is now {}", character.name, buff.label),
        )
    }

    fn resolve_remove_status(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        id: CharacterId,
        buff_id: BuffId,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };
        let Some(buff) = catalog.status_buff(buff_id) else {
            return Resolution::error(format!("No status buff with id {buff_id}"));
        };

        if !state.statuses.contains(id, buff_id) {
            return Resolution::new();
        }

        Resolution::new()
            .with_effect(Effect::BuffRemoved { id, buff: buff_id })
            .with_notice(
                Severity::Info,
                format!("Removed {} from {}", buff.label, character.name),
            )
    }

    fn resolve_remove_status_with_resist(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        id: CharacterId,
        buff_id: BuffId,
    ) -> Resolution {
        let Some(character) = catalog.character(id) else {
            return Resolution::error(format!("No character with id {id} in the catalog"));
        };
        let Some(buff) = catalog.status_buff(buff_id) else {
            return Resolution::error(format!("No status buff with id {buff_id}"));
        };

        if !state.statuses.contains(id, buff_id) {
            return Resolution::error(format!("{} is not {}", character.name, buff.label));
        }

        let Some(cost) = buff.resist.ap else {
            return Resolution::error(format!(
                "{} cannot be removed by spending AP",
                buff.label
            ));
        };

        let available = state.resources.ap(id).unwrap_or(0);
        if available < cost {
            return Resolution::error(format!(
                "{} needs {cost} AP to shake off {} (has {available})",
                character.name, buff.label
            ));
        }

        Resolution::new()
            .with_effect(Effect::ApSpent { id, amount: cost })
            .with_effect(Effect::BuffRemoved { id, buff: buff_id })
            .with_notice(
                Severity::Success,
                format!(
                    "{} spends {cost} AP to shake off {}",
                    character.name, buff.label
                ),
            )
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_attack(
        &self,
        catalog: &Catalog,
        config: &RuleConfig,
        state: &BattleState,
        attacker_id: CharacterId,
        defender_id: CharacterId,
        outcome: AttackOutcome,
        mods: AttackModifiers,
    ) -> Resolution {
        let Some(attacker) = catalog.character(attacker_id) else {
            return Resolution::error(format!("No attacker with id {attacker_id}"));
        };
        let Some(defender) = catalog.character(defender_id) else {
            return Resolution::error(format!("No defender with id {defender_id}"));
        };
        if attacker_id == defender_id {
            return Resolution::error("A character cannot attack itself");
        }

        if outcome.is_counter() {
            // The defender retaliates: damage flows back at the attacker and
            // the counterer spends no AP.
            let damage = match outcome {
                AttackOutcome::CounterHit => defender.attack().damage,
                AttackOutcome::CounterCritical => critical_damage(defender.attack().damage),
                _ => {
                    return Resolution::new().with_notice(
                        Severity::Info,
                        format!(
                            "{}'s counter-attack misses {}",
                            defender.name, attacker.name
                        ),
                    );
                }
            };

            let hp_after = state
                .resources
                .hp(attacker_id)
                .unwrap_or(0)
                .saturating_sub(damage);
            let message = match outcome {
                AttackOutcome::CounterCritical => format!(
                    "Critical counter! {} hits {} for {damage} damage (HP: {hp_after})",
                    defender.name, attacker.name
                ),
                _ => format!(
                    "{} counters {} for {damage} damage (HP: {hp_after})",
                    defender.name, attacker.name
                ),
            };

            return Resolution::new()
                .with_effect(Effect::DamageApplied {
                    id: attacker_id,
                    amount: damage,
                })
                .with_notice(Severity::Success, message);
        }

        let base_cost = attacker.attack().ap_cost;
        let cost = match outcome {
            AttackOutcome::Critical => base_cost * config.critical_ap_cost.multiplier(),
            _ => base_cost,
        };

        let available = state.resources.ap(attacker_id).unwrap_or(0);
        if !mods.free_action && available < cost {
            return Resolution::error(format!(
                "{} does not have enough AP to attack",
                attacker.name
            ));
        }

        let mut resolution = Resolution::new();
        if !mods.free_action {
            if cost > 0 {
                resolution = resolution.with_effect(Effect::ApSpent {
                    id: attacker_id,
                    amount: cost,
                });
            }
            resolution = resolution.with_effect(Effect::AttemptRecorded { id: attacker_id });
        }

        match outcome {
            AttackOutcome::Miss => resolution.with_notice(
                Severity::Info,
                format!("{}'s attack misses {}", attacker.name, defender.name),
            ),
            AttackOutcome::Hit => {
                let damage = attacker.attack().damage;
                let hp_after = state
                    .resources
                    .hp(defender_id)
                    .unwrap_or(0)
                    .saturating_sub(damage);
                resolution
                    .with_effect(Effect::DamageApplied {
                        id: defender_id,
                        amount: damage,
                    })
                    .with_notice(
                        Severity::Success,
                        format!(
                            "{} hits {} for {damage} damage (HP: {hp_after})",
                            attacker.name, defender.name
                        ),
                    )
            }
            _ => {
                let mut damage = critical_damage(attacker.attack().damage);
                if mods.damage_bonus && config.role_has_damage_bonus(&attacker.role) {
                    damage += CRITICAL_ROLE_BONUS;
                }
                let hp_after = state
                    .resources
                    .hp(defender_id)
                    .unwrap_or(0)
                    .saturating_sub(damage);
                resolution
                    .with_effect(Effect::DamageApplied {
                        id: defender_id,
                        amount: damage,
                    })
                    .with_notice(
                        Severity::Success,
                        format!(
                            "Critical! {} hits {} for {damage} damage (HP: {hp_after})",
                            attacker.name, defender.name
                        ),
                    )
            }
        }
    }

    fn resolve_use_skill(
        &self,
        catalog: &Catalog,
        state: &BattleState,
        attacker_id: CharacterId,
        defender_id: CharacterId,
        skill_id: SkillId,
    ) -> Resolution {
        let Some(attacker) = catalog.character(attacker_id) else {
            return Resolution::error(format!("No attacker with id {attacker_id}"));
        };
        let Some(defender) = catalog.character(defender_id) else {
            return Resolution::error(format!("No defender with id {defender_id}"));
        };
        if attacker_id == defender_id {
            return Resolution::error("A character cannot attack itself");
        }
        let Some(skill) = attacker.skill(skill_id) else {
            return Resolution::error(format!(
                "{} has no skill with id {skill_id}",
                attacker.name
            ));
        };

        let available = state.resources.ap(attacker_id).unwrap_or(0);
        if available < skill.ap_cost {
            return Resolution::error(format!(
                "{} needs {} AP for {} (has {available})",
                attacker.name, skill.ap_cost, skill.name
            ));
        }

        // Spending the cost is the engine's whole job here: damage and card
        // effects are declared at the table and applied by the caller.
        Resolution::new()
            .with_effect(Effect::ApSpent {
                id: attacker_id,
                amount: skill.ap_cost,
            })
            .with_notice(
                Severity::Success,
                format!("{} uses {} on {}", attacker.name, skill.name, defender.name),
            )
    }

    fn resolve_end_turn(&self, catalog: &Catalog, state: &BattleState) -> Resolution {
        let mut resolution = Resolution::new().with_effect(Effect::TurnAdvanced);
        for character in catalog.characters() {
            resolution = resolution.with_effect(Effect::ApSet {
                id: character.id,
                ap: character.status.ap,
            });
        }
        resolution.with_notice(
            Severity::Info,
            format!(
                "Turn {} begins; AP restored for all characters",
                state.turn.number() + 1
            ),
        )
    }

    fn resolve_reset_turn(&self, catalog: &Catalog, config: &RuleConfig) -> Resolution {
        let mut resolution = Resolution::new().with_effect(Effect::TurnReset);
        for character in catalog.characters() {
            resolution = resolution
                .with_effect(Effect::HpSet {
                    id: character.id,
                    hp: stats::baseline_hp(character, &config.race_bonuses),
                })
                .with_effect(Effect::ApSet {
                    id: character.id,
                    ap: character.status.ap,
                });
        }
        resolution.with_notice(Severity::Info, "Turn reset; HP and AP fully restored")
    }
}

// ============================================================================
// Applying effects
// ============================================================================

/// Apply every effect of a resolution, in order.
pub fn apply_effects(state: &mut BattleState, effects: &[Effect]) {
    for effect in effects {
        apply_effect(state, effect);
    }
}

/// Apply a single effect to the battle state.
pub fn apply_effect(state: &mut BattleState, effect: &Effect) {
    match effect {
        Effect::AddedToTeam { id, team } => state.rosters.insert(*id, *team),
        Effect::RemovedFromTeam { id, team } => state.rosters.remove(*id, *team),
        Effect::TeamsCleared => {
            state.rosters.clear();
            state.boosts.clear();
            state.statuses.clear();
        }
        Effect::DamageApplied { id, amount } => state.resources.apply_damage(*id, *amount),
        Effect::ApSpent { id, amount } => state.resources.spend_ap(*id, *amount),
        Effect::HpSet { id, hp } => state.resources.set_hp(*id, *hp),
        Effect::ApSet { id, ap } => state.resources.set_ap(*id, *ap),
        Effect::BoostAssigned { id, boost } => {
            state.boosts.insert(*id, *boost);
        }
        Effect::BoostCleared { id } => {
            state.boosts.remove(id);
        }
        Effect::BuffAdded { id, buff } => {
            state.statuses.add(*id, *buff);
        }
        Effect::BuffRemoved { id, buff } => {
            state.statuses.remove(*id, *buff);
        }
        Effect::StatusesCleared { id } => state.statuses.clear_for(*id),
        Effect::AttemptRecorded { id } => state.turn.record_attempt(*id),
        Effect::TurnAdvanced => state.turn.advance(),
        Effect::TurnReset => state.turn.reset(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Catalog, RuleConfig, BattleState, RulesEngine) {
        let catalog = Catalog::sample();
        let config = RuleConfig::default();
        let state = BattleState::new(&catalog, &config.race_bonuses);
        (catalog, config, state, RulesEngine::new())
    }

    #[test]
    fn critical_damage_rounds_up() {
        assert_eq!(critical_damage(4), 6);
        assert_eq!(critical_damage(3), 5);
        assert_eq!(critical_damage(2), 3);
        assert_eq!(critical_damage(1), 2);
        assert_eq!(critical_damage(0), 0);
    }

    #[test]
    fn prospective_numbers_follow_panel_math() {
        let mods = AttackModifiers {
            melee: true,
            gang_up: true,
            ..Default::default()
        };
        assert_eq!(prospective_hit(4, 2, mods), 4 + 4 + 4 - 2);
        assert_eq!(
            prospective_defense(
                5,
                AttackModifiers {
                    light_cover: true,
                    ..Default::default()
                }
            ),
            3
        );
        assert_eq!(prospective_hit(4, 0, AttackModifiers::default()), 4);
    }

    #[test]
    fn self_targeting_is_rejected_without_effects() {
        let (catalog, config, state, engine) = setup();
        let resolution = engine.resolve(
            &catalog,
            &config,
            &state,
            Command::Attack {
                attacker: CharacterId(1),
                defender: CharacterId(1),
                outcome: AttackOutcome::Hit,
                modifiers: AttackModifiers::default(),
            },
        );
        assert!(resolution.effects.is_empty());
        assert_eq!(resolution.notices[0].severity, Severity::Error);
    }

    #[test]
    fn counter_attack_spends_no_ap() {
        let (catalog, config, state, engine) = setup();
        let resolution = engine.resolve(
            &catalog,
            &config,
            &state,
            Command::Attack {
                attacker: CharacterId(1),
                defender: CharacterId(2),
                outcome: AttackOutcome::CounterHit,
                modifiers: AttackModifiers::default(),
            },
        );
        assert!(resolution
            .effects
            .iter()
            .all(|e| !matches!(e, Effect::ApSpent { .. } | Effect::AttemptRecorded { .. })));
        // Damage lands on the attacker, dealt by the defender.
        assert!(resolution.effects.iter().any(
            |e| matches!(e, Effect::DamageApplied { id, amount } if *id == CharacterId(1) && *amount == 2)
        ));
    }

    #[test]
    fn double_critical_cost_is_opt_in() {
        let (catalog, _, state, engine) = setup();
        let config = RuleConfig::default().with_critical_ap_cost(CriticalApCost::Double);
        let resolution = engine.resolve(
            &catalog,
            &config,
            &state,
            Command::Attack {
                attacker: CharacterId(1),
                defender: CharacterId(2),
                outcome: AttackOutcome::Critical,
                modifiers: AttackModifiers::default(),
            },
        );
        assert!(resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ApSpent { amount, .. } if *amount == 2)));
    }

    #[test]
    fn free_action_skips_cost_and_attempt() {
        let (catalog, config, state, engine) = setup();
        let resolution = engine.resolve(
            &catalog,
            &config,
            &state,
            Command::Attack {
                attacker: CharacterId(1),
                defender: CharacterId(2),
                outcome: AttackOutcome::Hit,
                modifiers: AttackModifiers {
                    free_action: true,
                    ..Default::default()
                },
            },
        );
        assert!(resolution
            .effects
            .iter()
            .all(|e| !matches!(e, Effect::ApSpent { .. } | Effect::AttemptRecorded { .. })));
        assert!(resolution
            .effects
            .iter()
            .any(|e| matches!(e, Effect::DamageApplied { .. })));
    }
}
