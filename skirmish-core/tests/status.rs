//! Status-effect tracking: idempotent application, affliction side effects,
//! attack gating, and the resist-cost removal flow.

use skirmish_core::testing::{fixture_session, GALE, ROOK};
use skirmish_core::{BuffId, Severity, Team};

const FEARFUL: BuffId = BuffId(1);
const FROZEN: BuffId = BuffId(2);
const BLEEDING: BuffId = BuffId(3);

#[test]
fn adding_a_buff_twice_is_a_notified_no_op() {
    let mut session = fixture_session();
    session.add_to_team(ROOK, Team::A);

    session.add_status_buff(ROOK, FEARFUL);
    assert_eq!(session.active_statuses(ROOK), &[FEARFUL]);
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Success
    );

    session.add_status_buff(ROOK, FEARFUL);
    assert_eq!(session.active_statuses(ROOK), &[FEARFUL]);
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Info
    );
}

#[test]
fn action_category_buffs_cost_one_ap_on_affliction() {
    let mut session = fixture_session();

    assert_eq!(session.ap(ROOK), Some(2));
    session.add_status_buff(ROOK, FROZEN);
    assert_eq!(session.ap(ROOK), Some(1));

    // Non-action categories leave AP alone.
    session.add_status_buff(GALE, BLEEDING);
    assert_eq!(session.ap(GALE), Some(3));
}

#[test]
fn disabling_buffs_gate_the_attack_action() {
    let mut session = fixture_session();

    assert!(!session.is_attack_disabled_by_buff(ROOK));

    session.add_status_buff(ROOK, BLEEDING);
    assert!(!session.is_attack_disabled_by_buff(ROOK));

    session.add_status_buff(ROOK, FEARFUL);
    assert!(session.is_attack_disabled_by_buff(ROOK));

    session.remove_status_buff(ROOK, FEARFUL);
    assert!(!session.is_attack_disabled_by_buff(ROOK));
}

#[test]
fn removing_an_absent_buff_is_silent() {
    let mut session = fixture_session();
    let count = session.notifications().len();

    session.remove_status_buff(ROOK, FEARFUL);

    assert_eq!(session.notifications().len(), count);
    assert!(session.active_statuses(ROOK).is_empty());
}

#[test]
fn unknown_buff_ids_are_errors() {
    let mut session = fixture_session();

    session.add_status_buff(ROOK, BuffId(99));
    assert!(session.active_statuses(ROOK).is_empty());
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Error
    );
}

#[test]
fn resist_removal_is_blocked_without_enough_ap() {
    let mut session = fixture_session();

    // Afflicting Frozen (an action buff) drops Rook to 1 AP, below the
    // 2 AP resist cost.
    session.add_status_buff(ROOK, FROZEN);
    assert_eq!(session.ap(ROOK), Some(1));

    session.remove_status_buff_with_resist(ROOK, FROZEN);
    assert_eq!(session.active_statuses(ROOK), &[FROZEN]);
    assert_eq!(session.ap(ROOK), Some(1));
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Error
    );

    // A fresh turn refills AP; now the removal goes through atomically.
    session.end_turn();
    session.remove_status_buff_with_resist(ROOK, FROZEN);
    assert!(session.active_statuses(ROOK).is_empty());
    assert_eq!(session.ap(ROOK), Some(0));
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Success
    );
}

#[test]
fn resist_removal_requires_an_ap_cost_on_the_buff() {
    let mut session = fixture_session();

    // Bleeding has no AP removal cost in its resist hint.
    session.add_status_buff(ROOK, BLEEDING);
    session.remove_status_buff_with_resist(ROOK, BLEEDING);

    assert_eq!(session.active_statuses(ROOK), &[BLEEDING]);
    assert_eq!(
        session.notifications().last().unwrap().severity,
        Severity::Error
    );
}

#[test]
fn statuses_preserve_application_order() {
    let mut session = fixture_session();

    session.add_status_buff(ROOK, FROZEN);
    session.add_status_buff(ROOK, FEARFUL);
    session.add_status_buff(ROOK, BLEEDING);

    assert_eq!(session.active_statuses(ROOK), &[FROZEN, FEARFUL, BLEEDING]);
}
