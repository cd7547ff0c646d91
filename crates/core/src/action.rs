use crate::error::ActionError;
use crate::types::{ActionKind, Pos, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionPayload {
    /// Inventory slot of the consumable to use.
    Item { slot: usize },
    Target(UnitId),
}

/// A fully resolved decision: what to do, with what, and where to stand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    payload: Option<ActionPayload>,
    destination: Pos,
}

impl Action {
    /// Fails unless Item carries an item slot, Attack carries a target, and Wait carries nothing.
    pub fn new(
        kind: ActionKind,
        payload: Option<ActionPayload>,
        destination: Pos,
    ) -> Result<Self, ActionError> {
        match (kind, payload) {
            (ActionKind::Wait, None)
            | (ActionKind::Item, Some(ActionPayload::Item { .. }))
            | (ActionKind::Attack, Some(ActionPayload::Target(_))) => {
                Ok(Self { kind, payload, destination })
            }
            (ActionKind::Wait, Some(_)) => Err(ActionError::UnexpectedPayload),
            (_, None) => Err(ActionError::MissingPayload { kind }),
            (_, Some(_)) => Err(ActionError::PayloadMismatch { kind }),
        }
    }

    pub fn wait(destination: Pos) -> Self {
        Self { kind: ActionKind::Wait, payload: None, destination }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn payload(&self) -> Option<ActionPayload> {
        self.payload
    }

    pub fn destination(&self) -> Pos {
        self.destination
    }

    pub fn target(&self) -> Option<UnitId> {
        match self.payload {
            Some(ActionPayload::Target(target)) => Some(target),
            _ => None,
        }
    }

    pub fn item_slot(&self) -> Option<usize> {
        match self.payload {
            Some(ActionPayload::Item { slot }) => Some(slot),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        self.kind.index()
    }
}
