//! Error kinds surfaced by the decision loop, the table store, and battle setup.

use std::io;

use thiserror::Error;

use crate::types::{ActionKind, Pos, Side, UnitId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("{kind:?} actions must carry a payload")]
    MissingPayload { kind: ActionKind },

    #[error("{kind:?} action carries a payload of the wrong kind")]
    PayloadMismatch { kind: ActionKind },

    #[error("wait actions take no payload")]
    UnexpectedPayload,
}

/// Raised when a controller is asked for a choice its position cannot support.
/// Both variants mean the feasibility mask and the resolver disagreed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecisionError {
    #[error("no enemy is in attack range of {unit:?} at ({}, {})", pos.x, pos.y)]
    NoAttackableTarget { unit: UnitId, pos: Pos },

    #[error("{unit:?} holds no usable consumable")]
    NoUsableItem { unit: UnitId },

    #[error("{unit:?} cannot attack {target:?}")]
    InvalidTarget { unit: UnitId, target: UnitId },
}

#[derive(Debug, Error)]
pub enum QTableError {
    #[error("value table I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode value table: {0}")]
    Encode(serde_json::Error),

    #[error("failed to decode value table: {0}")]
    Decode(serde_json::Error),

    #[error("value table shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },

    #[error("value table checksum does not match its contents")]
    ChecksumMismatch,

    #[error("value table was written for `{found}`, expected `{expected}`")]
    KeyMismatch { expected: String, found: String },

    #[error("unsupported value table format version {0}")]
    UnsupportedVersion(u16),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("unknown item code {0:#x}")]
    UnknownItem(u16),

    #[error("unknown job code {0:#x}")]
    UnknownJob(u16),

    #[error("unknown terrain symbol `{symbol}` at ({x}, {y})")]
    UnknownTerrain { symbol: char, x: usize, y: usize },

    #[error("map rows must be non-empty and of equal width")]
    RaggedMap,

    #[error("{name} is placed on an impassable or out-of-bounds tile")]
    BadPlacement { name: String },

    #[error("{0:?} roster is empty")]
    EmptyRoster(Side),

    #[error("turn limit must be at least 1")]
    ZeroTurnLimit,
}

#[derive(Debug, Error)]
pub enum BattleError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Table(#[from] QTableError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
