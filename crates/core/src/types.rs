use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::unit::Unit;

new_key_type! {
    pub struct UnitId;
}

/// Arena holding every unit of a battle; rosters refer into it by id.
pub type Units = SlotMap<UnitId, Unit>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

/// The three abstract actions a unit can pick each activation.
/// The discriminant is the action's column in the value table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Wait = 0,
    Item = 1,
    Attack = 2,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Wait, ActionKind::Item, ActionKind::Attack];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// How a controller arrived at its abstract action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMode {
    Scripted,
    Explore,
    Exploit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatResult {
    NoDeath,
    AttackerDeath,
    DefenderDeath,
}

/// Result of advancing the battle by one activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Continue,
    BlueWins,
    RedWins,
}

impl StepOutcome {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::Blue => StepOutcome::BlueWins,
            Side::Red => StepOutcome::RedWins,
        }
    }

    /// `+1` for a Blue win, `-1` for a Red win, `0` while the battle continues.
    pub fn signal(self) -> i8 {
        match self {
            StepOutcome::Continue => 0,
            StepOutcome::BlueWins => 1,
            StepOutcome::RedWins => -1,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            StepOutcome::Continue => None,
            StepOutcome::BlueWins => Some(Side::Blue),
            StepOutcome::RedWins => Some(Side::Red),
        }
    }

    pub fn is_finished(self) -> bool {
        self != StepOutcome::Continue
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BattleEvent {
    PhaseStarted { side: Side, turn: u32 },
    ActionChosen { unit: UnitId, kind: ActionKind, mode: DecisionMode },
    Moved { unit: UnitId, from: Pos, to: Pos },
    Attacked { attacker: UnitId, defender: UnitId, result: CombatResult },
    Healed { unit: UnitId, amount: i32 },
    Defeated { unit: UnitId, side: Side, terminal: bool },
    Finished { outcome: StepOutcome, turn: u32 },
}
