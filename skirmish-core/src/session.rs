//! BattleSession - the primary public API for the combat tracker.
//!
//! The session is the single explicitly-owned aggregate for one battle: it
//! owns the catalog, the battle state, the rules engine, and the
//! notification log, and funnels every mutation through the resolve/apply
//! pipeline. The view layer holds one of these, calls the command methods,
//! and re-reads the query surface after each call.

use crate::catalog::{BuffId, Catalog, Character, CharacterId, SkillId};
use crate::notify::{Notification, NotificationId, NotificationLog, Severity};
use crate::rules::{
    self, apply_effects, AttackModifiers, AttackOutcome, Command, Resolution, RuleConfig,
    RulesEngine,
};
use crate::state::{BattleState, Team};
use crate::stats::{self, BoostKind, StatKind};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// A battle session.
///
/// All command methods return `()`; outcomes are observed through the query
/// surface and the notification log. Failures never panic and never throw;
/// they surface as error notifications.
pub struct BattleSession {
    catalog: Catalog,
    config: RuleConfig,
    state: BattleState,
    rules: RulesEngine,
    notifications: NotificationLog,
    attack_in_flight: bool,
}

impl BattleSession {
    /// Start a session with the default rule configuration.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_config(catalog, RuleConfig::default())
    }

    /// Start a session with a custom rule configuration.
    pub fn with_config(catalog: Catalog, config: RuleConfig) -> Self {
        let state = BattleState::new(&catalog, &config.race_bonuses);
        let notifications = NotificationLog::new(config.notification_ttl);
        Self {
            catalog,
            config,
            state,
            rules: RulesEngine::new(),
            notifications,
            attack_in_flight: false,
        }
    }

    /// Resolve and apply a command; returns the applied resolution.
    fn dispatch(&mut self, command: Command) -> Resolution {
        debug!(?command, "resolving command");
        let resolution = self
            .rules
            .resolve(&self.catalog, &self.config, &self.state, command);
        apply_effects(&mut self.state, &resolution.effects);
        for notice in &resolution.notices {
            self.notifications
                .push(notice.severity, notice.message.clone());
        }
        debug!(
            effects = resolution.effects.len(),
            notices = resolution.notices.len(),
            "command applied"
        );
        resolution
    }

    // ========================================================================
    // Roster commands
    // ========================================================================

    pub fn add_to_team(&mut self, id: CharacterId, team: Team) {
        self.dispatch(Command::AddToTeam { id, team });
    }

    pub fn remove_from_team(&mut self, id: CharacterId, team: Team) {
        self.dispatch(Command::RemoveFromTeam { id, team });
    }

    pub fn add_random_characters(&mut self, count: usize, team: Team) {
        self.dispatch(Command::AddRandomCharacters { count, team });
    }

    pub fn reset_teams(&mut self) {
        self.dispatch(Command::ResetTeams);
    }

    // ========================================================================
    // Resource commands
    // ========================================================================

    pub fn reduce_ap(&mut self, id: CharacterId, amount: u32) {
        self.dispatch(Command::ReduceAp { id, amount });
    }

    pub fn apply_damage(&mut self, id: CharacterId, damage: u32) {
        self.dispatch(Command::ApplyDamage { id, damage });
    }

    /// Damage without a notification, for flows that announce their own
    /// summary.
    pub fn apply_damage_quiet(&mut self, id: CharacterId, damage: u32) {
        self.dispatch(Command::ApplyDamageQuiet { id, damage });
    }

    pub fn reset_hp(&mut self, id: CharacterId) {
        self.dispatch(Command::ResetHp { id });
    }

    pub fn adjust_hp(&mut self, id: CharacterId, hp: i32) {
        self.dispatch(Command::AdjustHp { id, hp });
    }

    pub fn skip_turn(&mut self, id: CharacterId) {
        self.dispatch(Command::SkipTurn { id });
    }

    // ========================================================================
    // Boost and status commands
    // ========================================================================

    pub fn apply_stat_boost(&mut self, id: CharacterId, boost: BoostKind) {
        self.dispatch(Command::ApplyStatBoost { id, boost });
    }

    pub fn add_status_buff(&mut self, id: CharacterId, buff: BuffId) {
        self.dispatch(Command::AddStatusBuff { id, buff });
    }

    pub fn remove_status_buff(&mut self, id: CharacterId, buff: BuffId) {
        self.dispatch(Command::RemoveStatusBuff { id, buff });
    }

    /// Spend the buff's resist AP cost and remove it, or refuse when the
    /// character cannot afford it.
    pub fn remove_status_buff_with_resist(&mut self, id: CharacterId, buff: BuffId) {
        self.dispatch(Command::RemoveStatusBuffWithResist { id, buff });
    }

    // ========================================================================
    // Turn commands
    // ========================================================================

    pub fn end_turn(&mut self) {
        self.dispatch(Command::EndTurn);
    }

    pub fn reset_turn(&mut self) {
        self.dispatch(Command::ResetTurn);
    }

    // ========================================================================
    // Combat commands
    // ========================================================================

    /// Submit an attack with a declared outcome. Rejected while a previous
    /// attack's transient flags are still pending (see
    /// [`Self::release_attack_lock`]).
    pub fn perform_attack(
        &mut self,
        attacker: CharacterId,
        defender: CharacterId,
        outcome: AttackOutcome,
        modifiers: AttackModifiers,
    ) {
        if self.attack_in_flight {
            self.notifications
                .push(Severity::Error, "An attack is already being resolved");
            return;
        }
        let resolution = self.dispatch(Command::Attack {
            attacker,
            defender,
            outcome,
            modifiers,
        });
        if !resolution.effects.is_empty() {
            self.attack_in_flight = true;
        }
    }

    /// Submit a skill use. Shares the attack reentrancy guard.
    pub fn use_skill(&mut self, attacker: CharacterId, defender: CharacterId, skill: SkillId) {
        if self.attack_in_flight {
            self.notifications
                .push(Severity::Error, "An attack is already being resolved");
            return;
        }
        let resolution = self.dispatch(Command::UseSkill {
            attacker,
            defender,
            skill,
        });
        if !resolution.effects.is_empty() {
            self.attack_in_flight = true;
        }
    }

    /// Clear the reentrancy guard. The view calls this from the same
    /// fixed-delay reset that clears its transient modifier flags (2-3
    /// seconds after a resolved action).
    pub fn release_attack_lock(&mut self) {
        self.attack_in_flight = false;
    }

    /// Whether an attack submission is currently locked out.
    pub fn is_attack_locked(&self) -> bool {
        self.attack_in_flight
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Direct read access to the battle state.
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Members of a team, in join order.
    pub fn team(&self, team: Team) -> &[CharacterId] {
        self.state.rosters.members(team)
    }

    /// The team a character is assigned to, if any.
    pub fn assignment(&self, id: CharacterId) -> Option<Team> {
        self.state.rosters.assignment(id)
    }

    /// True iff the character is assigned to the *other* team; used to
    /// disable the add button for one side while the character sits on the
    /// other.
    pub fn is_team_disabled(&self, id: CharacterId, team: Team) -> bool {
        match self.state.rosters.assignment(id) {
            Some(assigned) => assigned != team,
            None => false,
        }
    }

    pub fn hp(&self, id: CharacterId) -> Option<u32> {
        self.state.resources.hp(id)
    }

    pub fn ap(&self, id: CharacterId) -> Option<u32> {
        self.state.resources.ap(id)
    }

    pub fn turn_number(&self) -> u32 {
        self.state.turn.number()
    }

    /// Attack attempts the character has made this turn.
    pub fn attack_attempts(&self, id: CharacterId) -> u32 {
        self.state.turn.attempts(id)
    }

    pub fn boost(&self, id: CharacterId) -> Option<BoostKind> {
        self.state.boosts.get(&id).copied()
    }

    /// Active status buffs, in application order.
    pub fn active_statuses(&self, id: CharacterId) -> &[BuffId] {
        self.state.statuses.for_character(id)
    }

    /// True iff an active buff disables the attack action.
    pub fn is_attack_disabled_by_buff(&self, id: CharacterId) -> bool {
        self.state
            .statuses
            .for_character(id)
            .iter()
            .filter_map(|&buff| self.catalog.status_buff(buff))
            .any(|buff| self.config.buff_disables_attack(&buff.name))
    }

    /// Effective stat: base + race bonus + boost delta.
    pub fn effective_stat(&self, id: CharacterId, stat: StatKind) -> Option<i32> {
        let character = self.catalog.character(id)?;
        Some(stats::effective_stat(
            character,
            self.boost(id),
            &self.config.race_bonuses,
            stat,
        ))
    }

    /// Hit threshold displayed for a pending action by this attacker.
    pub fn prospective_hit(&self, id: CharacterId, mods: AttackModifiers) -> Option<i32> {
        let effective = self.effective_stat(id, StatKind::HitOn)?;
        Some(rules::prospective_hit(
            effective,
            self.attack_attempts(id),
            mods,
        ))
    }

    /// Defense threshold displayed for a pending action's target.
    pub fn prospective_defense(&self, id: CharacterId, mods: AttackModifiers) -> Option<i32> {
        let effective = self.effective_stat(id, StatKind::Def)?;
        Some(rules::prospective_defense(effective, mods))
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Live notifications, oldest first.
    pub fn notifications(&self) -> &[Notification] {
        self.notifications.entries()
    }

    /// Remove notifications whose fixed delay has elapsed.
    pub fn sweep_notifications(&mut self, now: Instant) -> usize {
        self.notifications.sweep(now)
    }

    /// Dismiss one notification before its scheduled expiry.
    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        self.notifications.dismiss(id)
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// An immutable, serializable view of the whole session, recomputed on
    /// every call.
    pub fn snapshot(&self) -> BattleSnapshot {
        let characters = self
            .catalog
            .characters()
            .iter()
            .map(|character| self.character_row(character))
            .collect();

        BattleSnapshot {
            turn_number: self.turn_number(),
            team_a: self.team(Team::A).to_vec(),
            team_b: self.team(Team::B).to_vec(),
            characters,
            notifications: self
                .notifications
                .entries()
                .iter()
                .map(|n| NotificationView {
                    id: n.id,
                    severity: n.severity,
                    message: n.message.clone(),
                })
                .collect(),
        }
    }

    fn character_row(&self, character: &Character) -> CharacterRow {
        let id = character.id;
        CharacterRow {
            id,
            name: character.name.clone(),
            team: self.assignment(id),
            hp: self.hp(id).unwrap_or(0),
            ap: self.ap(id).unwrap_or(0),
            boost: self.boost(id),
            statuses: self.active_statuses(id).to_vec(),
            attack_disabled: self.is_attack_disabled_by_buff(id),
        }
    }
}

/// Per-character row of a [`BattleSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct CharacterRow {
    pub id: CharacterId,
    pub name: String,
    pub team: Option<Team>,
    pub hp: u32,
    pub ap: u32,
    pub boost: Option<BoostKind>,
    pub statuses: Vec<BuffId>,
    pub attack_disabled: bool,
}

/// Notification entry of a [`BattleSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: NotificationId,
    pub severity: Severity,
    pub message: String,
}

/// Immutable view of the session for the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct BattleSnapshot {
    pub turn_number: u32,
    pub team_a: Vec<CharacterId>,
    pub team_b: Vec<CharacterId>,
    pub characters: Vec<CharacterRow>,
    pub notifications: Vec<NotificationView>,
}
