//! Blue's controller: a value-table learner picks the abstract action and
//! deterministic heuristics turn it into a destination, target, or item.

use rand_chacha::ChaCha8Rng;

use super::{ActionChoice, Controller, DecisionContext};
use crate::config::{HeuristicParams, LearningParams};
use crate::error::{DecisionError, QTableError};
use crate::heuristics::{attack_destination, best_target, wait_destination};
use crate::policy::QLearner;
use crate::random::choose;
use crate::store::{QTableKey, QTableStore};
use crate::types::{ActionKind, Pos, UnitId};

pub struct LearningController {
    key: QTableKey,
    learner: QLearner,
    heuristics: HeuristicParams,
    disposed: bool,
}

impl LearningController {
    pub fn new(key: QTableKey, learner: QLearner, heuristics: HeuristicParams) -> Self {
        Self { key, learner, heuristics, disposed: false }
    }

    /// Starts from whatever table `store` holds for `key`.
    pub fn load(
        key: QTableKey,
        params: LearningParams,
        heuristics: HeuristicParams,
        store: &dyn QTableStore,
    ) -> Result<Self, QTableError> {
        let table = store.load(&key)?;
        Ok(Self::new(key, QLearner::new(table, params), heuristics))
    }

    pub fn key(&self) -> &QTableKey {
        &self.key
    }

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }
}

impl Controller for LearningController {
    fn decide_action(&mut self, ctx: &DecisionContext<'_>, rng: &mut ChaCha8Rng) -> ActionChoice {
        let state = ctx.observe();
        let mask = ctx.mask();
        let decision = self.learner.select(state, mask, rng);
        tracing::debug!(
            unit = %self.key.unit_name,
            threats = state.threats,
            health = state.health_bucket,
            action = ?decision.kind,
            mode = ?decision.mode,
            "learner decided"
        );
        ActionChoice { kind: decision.kind, mode: decision.mode }
    }

    fn decide_move(
        &mut self,
        kind: ActionKind,
        ctx: &DecisionContext<'_>,
        _rng: &mut ChaCha8Rng,
    ) -> Result<Pos, DecisionError> {
        let destinations = ctx.legal_destinations();
        match kind {
            ActionKind::Attack => {
                attack_destination(ctx, &self.heuristics, &destinations).map(|(pos, _)| pos)
            }
            ActionKind::Wait | ActionKind::Item => {
                Ok(wait_destination(ctx, &self.heuristics, &destinations))
            }
        }
    }

    fn decide_target(
        &mut self,
        ctx: &DecisionContext<'_>,
        _rng: &mut ChaCha8Rng,
    ) -> Result<UnitId, DecisionError> {
        best_target(ctx, &self.heuristics)
    }

    fn decide_item(
        &mut self,
        ctx: &DecisionContext<'_>,
        rng: &mut ChaCha8Rng,
    ) -> Result<usize, DecisionError> {
        let slots = ctx.me().consumable_slots();
        choose(rng, &slots).copied().ok_or(DecisionError::NoUsableItem { unit: ctx.unit })
    }

    fn learn(&mut self, ctx: &DecisionContext<'_>, reward: f64) {
        self.learner.learn_transition(ctx.observe(), reward);
    }

    fn dispose(
        &mut self,
        terminal_reward: Option<f64>,
        store: &mut dyn QTableStore,
    ) -> Result<(), QTableError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        if let Some(reward) = terminal_reward {
            self.learner.terminal_update(reward);
        }
        store.save(&self.key, self.learner.table())
    }

    fn is_learning(&self) -> bool {
        true
    }
}

impl Drop for LearningController {
    fn drop(&mut self) {
        if !self.disposed {
            tracing::warn!(unit = %self.key.unit_name, "learner dropped without saving its table");
        }
    }
}
