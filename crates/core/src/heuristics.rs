//! Deterministic destination and target scoring for learning units.
//! The learner only picks the abstract action; these functions pick where to stand and whom to hit.

use crate::combat::ParticipantSummary;
use crate::config::HeuristicParams;
use crate::controller::DecisionContext;
use crate::error::DecisionError;
use crate::map::manhattan;
use crate::types::{Pos, UnitId};

/// Manhattan distance from `pos` to the nearest living enemy.
pub fn closest_enemy_distance(ctx: &DecisionContext<'_>, pos: Pos) -> Option<u32> {
    ctx.enemies
        .iter()
        .filter_map(|id| ctx.units.get(*id))
        .map(|enemy| manhattan(pos, enemy.pos))
        .min()
}

/// Movement score for Wait and Item: approach enemies when healthy, retreat
/// when below `zeta`, and favour tiles with both defense and avoid.
pub fn wait_score(ctx: &DecisionContext<'_>, params: &HeuristicParams, to: Pos) -> f64 {
    let me = ctx.me();
    let approach = match (closest_enemy_distance(ctx, me.pos), closest_enemy_distance(ctx, to)) {
        (Some(now), Some(then)) => f64::from(now) - f64::from(then),
        _ => 0.0,
    };
    let tile = ctx.map.tile_at(to);
    approach * (me.health_fraction() - params.zeta)
        + params.phi * f64::from(tile.defense) * f64::from(tile.avoid)
}

/// Best-scoring tile by [`wait_score`]; the current tile wins when nothing scores.
pub fn wait_destination(
    ctx: &DecisionContext<'_>,
    params: &HeuristicParams,
    destinations: &[Pos],
) -> Pos {
    let mut best = ctx.me().pos;
    let mut best_score = f64::NEG_INFINITY;
    for to in destinations {
        let score = wait_score(ctx, params, *to);
        if score > best_score {
            best = *to;
            best_score = score;
        }
    }
    best
}

/// Expected output of attacking `target` from `from`, minus `tau` times the expected reply.
pub fn combat_score(
    ctx: &DecisionContext<'_>,
    params: &HeuristicParams,
    from: Pos,
    target: UnitId,
) -> f64 {
    let summary = ctx.combat.summary_at(ctx.me(), from, &ctx.units[target], ctx.map);
    let expected = |side: &ParticipantSummary| {
        let strikes = if side.doubling { 2.0 } else { 1.0 };
        let might = f64::from(side.might);
        strikes * (might * side.hit_chance + might * side.crit_chance)
    };
    expected(&summary.attacker) - params.tau * expected(&summary.defender)
}

/// Tile and target pair maximizing [`combat_score`] over every legal destination.
pub fn attack_destination(
    ctx: &DecisionContext<'_>,
    params: &HeuristicParams,
    destinations: &[Pos],
) -> Result<(Pos, UnitId), DecisionError> {
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for from in destinations {
        for target in ctx.map.attackable_units(ctx.units, ctx.unit, ctx.enemies, *from) {
            let score = combat_score(ctx, params, *from, target);
            if best.is_none() || score > best_score {
                best = Some((*from, target));
                best_score = score;
            }
        }
    }
    best.ok_or(DecisionError::NoAttackableTarget { unit: ctx.unit, pos: ctx.me().pos })
}

/// Highest-scoring enemy in range of the unit's current tile.
pub fn best_target(
    ctx: &DecisionContext<'_>,
    params: &HeuristicParams,
) -> Result<UnitId, DecisionError> {
    let here = ctx.me().pos;
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for target in ctx.attackable_here() {
        let score = combat_score(ctx, params, here, target);
        if best.is_none() || score > best_score {
            best = Some(target);
            best_score = score;
        }
    }
    best.ok_or(DecisionError::NoAttackableTarget { unit: ctx.unit, pos: here })
}
