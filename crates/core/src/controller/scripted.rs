//! Red's controller: a fixed priority over actions with random placement.

use rand_chacha::ChaCha8Rng;

use super::{ActionChoice, Controller, DecisionContext};
use crate::error::{DecisionError, QTableError};
use crate::random::choose;
use crate::store::QTableStore;
use crate::types::{ActionKind, DecisionMode, Pos, UnitId};

/// Health fraction at or below which a unit holding a consumable uses it.
pub const HEAL_THRESHOLD: f64 = 0.35;

#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptedController;

impl Controller for ScriptedController {
    fn decide_action(&mut self, ctx: &DecisionContext<'_>, _rng: &mut ChaCha8Rng) -> ActionChoice {
        let me = ctx.me();
        let mask = ctx.mask();
        let kind = if me.health_fraction() <= HEAL_THRESHOLD && !mask.is_masked(ActionKind::Item) {
            ActionKind::Item
        } else if !mask.is_masked(ActionKind::Attack) {
            ActionKind::Attack
        } else {
            ActionKind::Wait
        };
        ActionChoice { kind, mode: DecisionMode::Scripted }
    }

    fn decide_move(
        &mut self,
        kind: ActionKind,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Pos, DecisionError> {
        let mut destinations = ctx.legal_destinations();
        if kind == ActionKind::Attack {
            destinations.retain(|from| {
                !ctx.map.attackable_units(ctx.units, ctx.unit, ctx.enemies, *from).is_empty()
            });
            return choose(rng, &destinations)
                .copied()
                .ok_or(DecisionError::NoAttackableTarget { unit: ctx.unit, pos: ctx.me().pos });
        }
        Ok(choose(rng, &destinations).copied().unwrap_or(ctx.me().pos))
    }

    fn decide_target(
        &mut self,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<UnitId, DecisionError> {
        let targets = ctx.attackable_here();
        choose(rng, &targets)
            .copied()
            .ok_or(DecisionError::NoAttackableTarget { unit: ctx.unit, pos: ctx.me().pos })
    }

    fn decide_item(
        &mut self,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<usize, DecisionError> {
        let slots = ctx.me().consumable_slots();
        choose(rng, &slots).copied().ok_or(DecisionError::NoUsableItem { unit: ctx.unit })
    }

    fn dispose(
        &mut self,
        _terminal_reward: Option<f64>,
        _store: &mut dyn QTableStore,
    ) -> Result<(), QTableError> {
        Ok(())
    }
}
