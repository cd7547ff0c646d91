//! Single-activation flow: decide, move, act, then credit or dispose.
//! Phases advance eagerly so a step that exhausts the last Red unit of the
//! final turn already reports the turn-limit result.

use super::*;
use crate::action::{Action, ActionPayload};
use crate::controller::DecisionContext;
use crate::error::DecisionError;

/// What one applied action changed, as far as rewards and disposal care.
#[derive(Clone, Copy, Debug, Default)]
struct Applied {
    kills: u32,
    actor_died: bool,
}

impl Battle {
    /// Advances exactly one unit's activation. Once the battle is decided,
    /// further calls return the same outcome without side effects.
    pub fn step(&mut self) -> Result<StepOutcome, BattleError> {
        if self.outcome.is_finished() {
            return Ok(self.outcome);
        }
        if let Some(actor) = self.next_actor() {
            self.activate(actor)?;
        }
        while !self.outcome.is_finished() && !self.phase_has_actors() {
            self.end_phase()?;
        }
        Ok(self.outcome)
    }

    pub(super) fn begin_phase(&mut self) {
        self.queue = self.roster(self.phase).to_vec();
        self.cursor = 0;
        self.log.push(BattleEvent::PhaseStarted { side: self.phase, turn: self.turn });
    }

    fn end_phase(&mut self) -> Result<(), BattleError> {
        if self.phase == Side::Red {
            self.turn += 1;
            if self.turn >= self.config.turn_limit {
                self.outcome = StepOutcome::RedWins;
                return self.finish(None, 0.0);
            }
        }
        self.phase = self.phase.opponent();
        self.begin_phase();
        Ok(())
    }

    fn phase_has_actors(&self) -> bool {
        self.queue[self.cursor..].iter().any(|id| self.is_alive(*id))
    }

    fn next_actor(&mut self) -> Option<UnitId> {
        while let Some(id) = self.queue.get(self.cursor).copied() {
            self.cursor += 1;
            if self.is_alive(id) {
                return Some(id);
            }
        }
        None
    }

    fn activate(&mut self, actor: UnitId) -> Result<(), BattleError> {
        let Some(mut controller) = self.controllers.remove(actor) else {
            return Ok(());
        };
        let applied = match self.perform(actor, controller.as_mut()) {
            Ok(applied) => applied,
            Err(err) => {
                self.controllers.insert(actor, controller);
                return Err(err);
            }
        };
        let rewards = &self.config.rewards;
        let reward = rewards.step + rewards.kill * f64::from(applied.kills);

        if self.outcome.is_finished() {
            self.controllers.insert(actor, controller);
            return self.finish(Some(actor), reward);
        }
        if applied.actor_died {
            controller.dispose(Some(self.config.rewards.death), self.store.as_mut())?;
            return Ok(());
        }

        let side = self.units[actor].side;
        let (allies, enemies) = self.rosters(side);
        let ctx = DecisionContext {
            units: &self.units,
            map: self.map.as_ref(),
            combat: self.combat.as_ref(),
            unit: actor,
            allies: &allies,
            enemies: &enemies,
        };
        controller.learn(&ctx, reward);
        self.controllers.insert(actor, controller);
        Ok(())
    }

    /// Runs the decision sequence for `actor` and applies the resulting action.
    fn perform(
        &mut self,
        actor: UnitId,
        controller: &mut dyn Controller,
    ) -> Result<Applied, BattleError> {
        let side = self.units[actor].side;
        let (allies, enemies) = self.rosters(side);

        let ctx = DecisionContext {
            units: &self.units,
            map: self.map.as_ref(),
            combat: self.combat.as_ref(),
            unit: actor,
            allies: &allies,
            enemies: &enemies,
        };
        let choice = controller.decide_action(&ctx, &mut self.rng);
        let destination = controller.decide_move(choice.kind, &ctx, &mut self.rng)?;
        self.log.push(BattleEvent::ActionChosen {
            unit: actor,
            kind: choice.kind,
            mode: choice.mode,
        });

        let from = self.units[actor].pos;
        self.units[actor].goto(destination);
        if from != destination {
            self.log.push(BattleEvent::Moved { unit: actor, from, to: destination });
        }

        let ctx = DecisionContext {
            units: &self.units,
            map: self.map.as_ref(),
            combat: self.combat.as_ref(),
            unit: actor,
            allies: &allies,
            enemies: &enemies,
        };
        let payload = match choice.kind {
            ActionKind::Wait => None,
            ActionKind::Item => {
                Some(ActionPayload::Item { slot: controller.decide_item(&ctx, &mut self.rng)? })
            }
            ActionKind::Attack => {
                Some(ActionPayload::Target(controller.decide_target(&ctx, &mut self.rng)?))
            }
        };
        let action = Action::new(choice.kind, payload, destination)?;
        self.apply(actor, &action, &enemies)
    }

    fn apply(
        &mut self,
        actor: UnitId,
        action: &Action,
        enemies: &[UnitId],
    ) -> Result<Applied, BattleError> {
        if let Some(slot) = action.item_slot() {
            let amount = self.units[actor]
                .use_item(slot)
                .ok_or(DecisionError::NoUsableItem { unit: actor })?;
            self.log.push(BattleEvent::Healed { unit: actor, amount });
            return Ok(Applied::default());
        }
        let Some(target) = action.target() else {
            return Ok(Applied::default());
        };

        let here = self.units[actor].pos;
        if !self.map.attackable_units(&self.units, actor, enemies, here).contains(&target) {
            return Err(DecisionError::InvalidTarget { unit: actor, target }.into());
        }
        let summary =
            self.combat.summary(&self.units[actor], &self.units[target], self.map.as_ref());
        let [attacker, defender] = self
            .units
            .get_disjoint_mut([actor, target])
            .ok_or(DecisionError::InvalidTarget { unit: actor, target })?;
        let result = self.combat.simulate(&summary, attacker, defender, &mut self.rng);
        self.log.push(BattleEvent::Attacked { attacker: actor, defender: target, result });

        match result {
            CombatResult::NoDeath => Ok(Applied::default()),
            CombatResult::DefenderDeath => {
                self.handle_death(target)?;
                Ok(Applied { kills: 1, actor_died: false })
            }
            CombatResult::AttackerDeath => {
                self.handle_death(actor)?;
                Ok(Applied { kills: 0, actor_died: true })
            }
        }
    }

    /// A terminal unit's death decides the battle and leaves it in the arena.
    /// Anyone else leaves its roster and the arena, and a learner among them
    /// is disposed on the spot.
    fn handle_death(&mut self, id: UnitId) -> Result<(), BattleError> {
        let unit = &self.units[id];
        let (side, terminal) = (unit.side, unit.terminal);
        self.log.push(BattleEvent::Defeated { unit: id, side, terminal });
        if terminal {
            self.outcome = StepOutcome::won_by(side.opponent());
            return Ok(());
        }

        match side {
            Side::Blue => self.blue.retain(|member| *member != id),
            Side::Red => self.red.retain(|member| *member != id),
        }
        self.units.remove(id);
        if let Some(mut controller) = self.controllers.remove(id) {
            controller.dispose(Some(self.config.rewards.death), self.store.as_mut())?;
        }
        if self.roster(side).is_empty() {
            self.outcome = StepOutcome::won_by(side.opponent());
        }
        Ok(())
    }

    /// Disposes every remaining controller with its final reward. Every
    /// controller is disposed even if an earlier save fails; the first
    /// failure is returned.
    fn finish(&mut self, actor: Option<UnitId>, bonus: f64) -> Result<(), BattleError> {
        self.log.push(BattleEvent::Finished { outcome: self.outcome, turn: self.turn });
        tracing::info!(
            seed = self.seed,
            turn = self.turn,
            outcome = ?self.outcome,
            "battle finished"
        );

        let rewards = self.config.rewards.clone();
        let winner = self.outcome.winner();
        let ids: Vec<UnitId> = self.controllers.keys().collect();
        let mut first_error = None;
        for id in ids {
            let Some(mut controller) = self.controllers.remove(id) else {
                continue;
            };
            let reward = match self.units.get(id) {
                Some(unit) if !unit.is_defeated() => {
                    let base =
                        if Some(unit.side) == winner { rewards.victory } else { rewards.defeat };
                    if Some(id) == actor { base + bonus } else { base }
                }
                _ => rewards.death,
            };
            if let Err(err) = controller.dispose(Some(reward), self.store.as_mut()) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}
