//! Interlocking state codes and the rules that tie them together.
//!
//! A switch state encodes two facts at once: the switch position and the
//! occupancy/locking of the section the switch sits in.
//!
//!   section  3..=8            free/occupied × unlocked/locked/releasing
//!   switch   3..=8            plus,  same sub-state as the section
//!            9..=14           minus, section sub-state + 6
//!            15..=20          loss of control (non-linear, see below)
//!            21               controlled, position unknown
//!
//! Everything else (0, 1, 2, 100) means no control / mismatch / conserved /
//! not provided, for every kind.

use crate::{event::EntityKind, types::StateCode};
use serde::{Deserialize, Serialize};

/// Signal subtype; decides which aspects a signal may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Train,
    Maneuver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPosition {
    Plus,
    Minus,
    /// Loss of control: the switch reports no end position.
    NoControl,
}

const RC_STATES: &[StateCode] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 100];

const SWITCH_STATES: &[StateCode] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 100,
];

const SIGNAL_STATES_TRAIN: &[StateCode] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 27,
];

const SIGNAL_STATES_MANEUVER: &[StateCode] = &[0, 1, 2, 3, 4, 5, 6, 7];

pub const INDICATOR_OFF: StateCode = 3;
pub const INDICATOR_LIT: StateCode = 4;

const INDICATOR_STATES: &[StateCode] = &[INDICATOR_OFF, INDICATOR_LIT];

/// Section code a switch falls back to when its section has no definite state.
pub const SECTION_FREE_UNLOCKED: StateCode = 3;

/// Authorable states for an entity. `signal_kind` only matters for signals.
pub fn allowed_states(kind: EntityKind, signal_kind: SignalKind) -> &'static [StateCode] {
    match kind {
        EntityKind::Rc        => RC_STATES,
        EntityKind::Switch    => SWITCH_STATES,
        EntityKind::Indicator => INDICATOR_STATES,
        EntityKind::Signal    => match signal_kind {
            SignalKind::Train    => SIGNAL_STATES_TRAIN,
            SignalKind::Maneuver => SIGNAL_STATES_MANEUVER,
        },
    }
}

/// State a staged entry is reset to by the batch "reset" action.
pub fn batch_reset_state(kind: EntityKind) -> StateCode {
    match kind {
        EntityKind::Rc | EntityKind::Signal => 0,
        EntityKind::Switch                  => 3,
        EntityKind::Indicator               => INDICATOR_OFF,
    }
}

fn is_definite_section_state(state: StateCode) -> bool {
    (3..=8).contains(&state)
}

/// Full switch code for `position` inside a section in `section_state`.
///
/// Sections without a definite free/occupied code (missing, 0, 1, 2, 100)
/// are treated as free and unlocked.
pub fn compose_switch_state(position: SwitchPosition, section_state: Option<StateCode>) -> StateCode {
    let rc = match section_state {
        Some(s) if is_definite_section_state(s) => s,
        _ => {
            return match position {
                SwitchPosition::Plus      => 3,
                SwitchPosition::Minus     => 9,
                SwitchPosition::NoControl => 15,
            }
        }
    };
    match position {
        SwitchPosition::Plus  => rc,
        SwitchPosition::Minus => rc + 6,
        SwitchPosition::NoControl => match rc {
            3 => 15,
            4 => 16,
            5 => 19,
            6 => 17,
            7 => 18,
            _ => 20,
        },
    }
}

/// Position bucket of a switch code. Codes without an end position or a
/// loss-of-control report (0, 1, 2, 21, 100) give `None`.
pub fn switch_position_by_state(state: StateCode) -> Option<SwitchPosition> {
    match state {
        3..=8   => Some(SwitchPosition::Plus),
        9..=14  => Some(SwitchPosition::Minus),
        15..=20 => Some(SwitchPosition::NoControl),
        _ => None,
    }
}

/// Section code implied by a switch code.
pub fn rc_state_from_switch_state(state: StateCode) -> Option<StateCode> {
    match state {
        3..=8  => Some(state),
        9..=14 => Some(state - 6),
        15 | 21 => Some(3),
        16 => Some(4),
        17 => Some(6),
        18 => Some(7),
        19 => Some(5),
        20 => Some(8),
        _ => None,
    }
}

/// Human-readable meaning of a code, if the code exists for that kind.
pub fn state_label(kind: EntityKind, signal_kind: SignalKind, state: StateCode) -> Option<&'static str> {
    let common = match state {
        0   => Some("undefined (no telecontrol)"),
        1   => Some("undefined (telecontrol mismatch)"),
        2   => Some("conserved"),
        100 => Some("state not provided"),
        _ => None,
    };
    match kind {
        EntityKind::Rc => common.or(match state {
            3 => Some("free, unlocked"),
            4 => Some("free, locked"),
            5 => Some("free, locked, artificial release"),
            6 => Some("occupied, unlocked"),
            7 => Some("occupied, locked"),
            8 => Some("occupied, locked, artificial release"),
            _ => None,
        }),
        EntityKind::Switch => common.or(match state {
            3  => Some("plus, free, unlocked"),
            4  => Some("plus, free, locked"),
            5  => Some("plus, free, locked, artificial release"),
            6  => Some("plus, occupied, unlocked"),
            7  => Some("plus, occupied, locked"),
            8  => Some("plus, occupied, locked, artificial release"),
            9  => Some("minus, free, unlocked"),
            10 => Some("minus, free, locked"),
            11 => Some("minus, free, locked, artificial release"),
            12 => Some("minus, occupied, unlocked"),
            13 => Some("minus, occupied, locked"),
            14 => Some("minus, occupied, locked, artificial release"),
            15 => Some("loss of control, free, unlocked"),
            16 => Some("loss of control, free, locked"),
            17 => Some("loss of control, occupied, unlocked"),
            18 => Some("loss of control, occupied, locked"),
            19 => Some("loss of control, free, locked, artificial release"),
            20 => Some("loss of control, occupied, locked, artificial release"),
            21 => Some("controlled, position unknown, free, unlocked"),
            _ => None,
        }),
        EntityKind::Indicator => match state {
            INDICATOR_OFF => Some("indicator off"),
            INDICATOR_LIT => Some("indicator lit red"),
            _ => None,
        },
        EntityKind::Signal => {
            if !allowed_states(EntityKind::Signal, signal_kind).contains(&state) {
                return None;
            }
            common.or(match signal_kind {
                SignalKind::Train    => Some("train signal aspect"),
                SignalKind::Maneuver => Some("maneuver signal aspect"),
            })
        }
    }
}
