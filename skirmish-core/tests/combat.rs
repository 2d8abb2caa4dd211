//! Combat resolver behavior: AP accounting, damage tiers, counters, and the
//! declared-outcome validation rules.

use skirmish_core::testing::{fixture_session, GALE, LONG_SHOT, ROOK, SHIELD_BASH, TORGA};
use skirmish_core::{
    AttackModifiers, AttackOutcome, BattleSession, CriticalApCost, RuleConfig, Severity, Team,
};

/// Route engine traces to the test output when RUST_LOG is set.
fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn battle_ready() -> BattleSession {
    setup();
    let mut session = fixture_session();
    session.add_to_team(ROOK, Team::A);
    session.add_to_team(TORGA, Team::A);
    session.add_to_team(GALE, Team::B);
    session
}

fn attack(session: &mut BattleSession, outcome: AttackOutcome) {
    session.perform_attack(ROOK, GALE, outcome, AttackModifiers::default());
    session.release_attack_lock();
}

#[test]
fn basic_attack_spends_ap_and_applies_damage() {
    let mut session = battle_ready();
    assert_eq!(session.ap(ROOK), Some(2));
    assert_eq!(session.hp(GALE), Some(8));

    attack(&mut session, AttackOutcome::Hit);
    assert_eq!(session.ap(ROOK), Some(1));
    assert_eq!(session.hp(GALE), Some(5));

    attack(&mut session, AttackOutcome::Hit);
    assert_eq!(session.ap(ROOK), Some(0));
    assert_eq!(session.hp(GALE), Some(2));

    // Third attempt in the same turn: rejected, nothing moves.
    attack(&mut session, AttackOutcome::Hit);
    assert_eq!(session.ap(ROOK), Some(0));
    assert_eq!(session.hp(GALE), Some(2));
    let last = session.notifications().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.message.contains("enough AP"));
}

#[test]
fn missed_attack_spends_ap_without_damage() {
    let mut session = battle_ready();

    attack(&mut session, AttackOutcome::Miss);
    assert_eq!(session.ap(ROOK), Some(1));
    assert_eq!(session.hp(GALE), Some(8));
    let last = session.notifications().last().unwrap();
    assert_eq!(last.severity, Severity::Info);
    assert!(last.message.contains("misses"));
}

#[test]
fn critical_damage_is_one_and_a_half_rounded_up() {
    let mut session = battle_ready();

    // Torga's 4-damage attack crits for ceil(4 * 1.5) = 6.
    session.perform_attack(TORGA, GALE, AttackOutcome::Critical, AttackModifiers::default());
    assert_eq!(session.hp(GALE), Some(2));
    assert_eq!(session.ap(TORGA), Some(1));
}

#[test]
fn critical_role_bonus_only_for_eligible_roles() {
    // Rook is a Vanguard: ceil(3 * 1.5) + 1 = 6.
    let mut session = battle_ready();
    session.perform_attack(
        ROOK,
        GALE,
        AttackOutcome::Critical,
        AttackModifiers {
            damage_bonus: true,
            ..Default::default()
        },
    );
    assert_eq!(session.hp(GALE), Some(2));

    // Torga is a Warden: the flag is ignored and damage stays at 6.
    let mut session = battle_ready();
    session.perform_attack(
        TORGA,
        GALE,
        AttackOutcome::Critical,
        AttackModifiers {
            damage_bonus: true,
            ..Default::default()
        },
    );
    assert_eq!(session.hp(GALE), Some(2));
}

#[test]
fn display_modifiers_never_change_damage() {
    let mut session = battle_ready();
    session.perform_attack(
        ROOK,
        GALE,
        AttackOutcome::Hit,
        AttackModifiers {
            melee: true,
            gang_up: true,
            light_cover: true,
            ..Default::default()
        },
    );
    assert_eq!(session.hp(GALE), Some(5));
}

#[test]
fn critical_double_cost_policy() {
    let mut session = BattleSession::with_config(
        skirmish_core::testing::fixture_catalog(),
        RuleConfig::default().with_critical_ap_cost(CriticalApCost::Double),
    );
    session.add_to_team(ROOK, Team::A);
    session.add_to_team(GALE, Team::B);

    session.perform_attack(ROOK, GALE, AttackOutcome::Critical, AttackModifiers::default());
    assert_eq!(session.ap(ROOK), Some(0));

    // With the default policy the same attack costs 1.
    let mut session = battle_ready();
    session.perform_attack(ROOK, GALE, AttackOutcome::Critical, AttackModifiers::default());
    assert_eq!(session.ap(ROOK), Some(1));
}

#[test]
fn free_action_bypasses_cost_and_escalation() {
    let mut session = battle_ready();
    let mods = AttackModifiers {
        free_action: true,
        ..Default::default()
    };

    session.perform_attack(ROOK, GALE, AttackOutcome::Hit, mods);
    session.release_attack_lock();

    assert_eq!(session.ap(ROOK), Some(2));
    assert_eq!(session.hp(GALE), Some(5));
    assert_eq!(session.attack_attempts(ROOK), 0);
}

#[test]
fn counters_reverse_damage_and_cost_nothing() {
    let mut session = battle_ready();

    session.perform_attack(ROOK, GALE, AttackOutcome::CounterHit, AttackModifiers::default());
    session.release_attack_lock();

    // Gale (damage 2) strikes back at Rook; nobody pays AP.
    assert_eq!(session.hp(ROOK), Some(8));
    assert_eq!(session.ap(ROOK), Some(2));
    assert_eq!(session.ap(GALE), Some(3));
    assert_eq!(session.attack_attempts(ROOK), 0);
    assert_eq!(session.attack_attempts(GALE), 0);

    session.perform_attack(ROOK, GALE, AttackOutcome::CounterCritical, AttackModifiers::default());
    session.release_attack_lock();
    // ceil(2 * 1.5) = 3 more damage to Rook.
    assert_eq!(session.hp(ROOK), Some(5));

    session.perform_attack(ROOK, GALE, AttackOutcome::CounterMiss, AttackModifiers::default());
    assert_eq!(session.hp(ROOK), Some(5));
    assert_eq!(session.hp(GALE), Some(8));
}

#[test]
fn self_targeting_is_rejected() {
    let mut session = battle_ready();
    session.perform_attack(ROOK, ROOK, AttackOutcome::Hit, AttackModifiers::default());

    assert_eq!(session.hp(ROOK), Some(10));
    assert_eq!(session.ap(ROOK), Some(2));
    let last = session.notifications().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
}

#[test]
fn damage_floors_at_zero() {
    let mut session = battle_ready();
    for _ in 0..2 {
        session.perform_attack(TORGA, GALE, AttackOutcome::Critical, AttackModifiers::default());
        session.release_attack_lock();
    }
    assert_eq!(session.hp(GALE), Some(0));
}

#[test]
fn skill_use_spends_exactly_the_skill_cost() {
    let mut session = battle_ready();

    session.use_skill(ROOK, GALE, SHIELD_BASH);
    session.release_attack_lock();

    assert_eq!(session.ap(ROOK), Some(0));
    // Skill use itself deals no damage; card effects are applied at the
    // table.
    assert_eq!(session.hp(GALE), Some(8));
    let last = session.notifications().last().unwrap();
    assert_eq!(last.severity, Severity::Success);
    assert!(last.message.contains("Shield Bash"));

    // Not enough AP for a second use.
    session.use_skill(ROOK, GALE, SHIELD_BASH);
    assert_eq!(session.ap(ROOK), Some(0));
    let last = session.notifications().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
}

#[test]
fn skill_must_belong_to_the_attacker() {
    let mut session = battle_ready();

    session.use_skill(ROOK, GALE, LONG_SHOT);
    assert_eq!(session.ap(ROOK), Some(2));
    let last = session.notifications().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
}

#[test]
fn unknown_combatants_are_rejected() {
    let mut session = battle_ready();
    session.perform_attack(
        skirmish_core::CharacterId(99),
        GALE,
        AttackOutcome::Hit,
        AttackModifiers::default(),
    );
    assert_eq!(session.hp(GALE), Some(8));
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Error
    );
}
