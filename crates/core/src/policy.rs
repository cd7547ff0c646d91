//! Tabular value function and the epsilon-greedy learner built on it.
//! This module owns action selection over the abstract actions and the value updates.
//! It does not own destination or target choice; see `heuristics`.

use rand_chacha::ChaCha8Rng;

use crate::config::LearningParams;
use crate::error::QTableError;
use crate::mask::ActionMask;
use crate::observation::{STATE_SLOTS, State};
use crate::random::{choose, unit_interval};
use crate::types::{ActionKind, DecisionMode};

pub const ACTION_COUNT: usize = 3;
pub const TABLE_SHAPE: [usize; 3] = [STATE_SLOTS, STATE_SLOTS, ACTION_COUNT];
const TABLE_LEN: usize = STATE_SLOTS * STATE_SLOTS * ACTION_COUNT;

/// Dense `10 x 10 x 3` table indexed by `(threats, health_bucket, action)`.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    values: Vec<f64>,
}

impl Default for QTable {
    fn default() -> Self {
        Self::zeros()
    }
}

impl QTable {
    pub fn zeros() -> Self {
        Self { values: vec![0.0; TABLE_LEN] }
    }

    /// Rebuilds a table from row-major values; the shape must match exactly.
    pub fn from_values(shape: &[usize], values: Vec<f64>) -> Result<Self, QTableError> {
        if shape != TABLE_SHAPE || values.len() != TABLE_LEN {
            let mut found = shape.to_vec();
            if found.iter().product::<usize>() != values.len() {
                found = vec![values.len()];
            }
            return Err(QTableError::ShapeMismatch { expected: TABLE_SHAPE.to_vec(), found });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Threat counts beyond the table fold into the last slot.
    fn offset(state: State) -> usize {
        let threats = state.threats.min(STATE_SLOTS - 1);
        let health = state.health_bucket.min(STATE_SLOTS - 1);
        (threats * STATE_SLOTS + health) * ACTION_COUNT
    }

    pub fn row(&self, state: State) -> [f64; ACTION_COUNT] {
        let start = Self::offset(state);
        [self.values[start], self.values[start + 1], self.values[start + 2]]
    }

    pub fn get(&self, state: State, kind: ActionKind) -> f64 {
        self.values[Self::offset(state) + kind.index()]
    }

    pub fn set(&mut self, state: State, kind: ActionKind, value: f64) {
        self.values[Self::offset(state) + kind.index()] = value;
    }

    /// Highest value in the row, over all actions regardless of feasibility.
    pub fn max_value(&self, state: State) -> f64 {
        self.row(state).into_iter().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// A selected abstract action and the state it was selected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub state: State,
    pub kind: ActionKind,
    pub mode: DecisionMode,
}

#[derive(Clone, Debug)]
pub struct QLearner {
    table: QTable,
    params: LearningParams,
    /// Most recent decision not yet credited. Consumed by whichever update
    /// comes first, so each decision is credited exactly once.
    last_decision: Option<Decision>,
}

impl QLearner {
    pub fn new(table: QTable, params: LearningParams) -> Self {
        Self { table, params, last_decision: None }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    /// Epsilon-greedy choice restricted to actions the mask leaves feasible.
    pub fn select(&mut self, state: State, mask: ActionMask, rng: &mut ChaCha8Rng) -> Decision {
        let feasible = mask.feasible();
        let decision = if unit_interval(rng) < self.params.epsilon {
            let kind = choose(rng, &feasible).copied().unwrap_or(ActionKind::Wait);
            Decision { state, kind, mode: DecisionMode::Explore }
        } else {
            Decision { state, kind: self.greedy(state, &feasible), mode: DecisionMode::Exploit }
        };
        self.last_decision = Some(decision);
        decision
    }

    /// First maximum among `feasible`, scanning in table-index order.
    fn greedy(&self, state: State, feasible: &[ActionKind]) -> ActionKind {
        let row = self.table.row(state);
        let mut best = ActionKind::Wait;
        let mut best_value = f64::NEG_INFINITY;
        for kind in feasible {
            if row[kind.index()] > best_value {
                best = *kind;
                best_value = row[kind.index()];
            }
        }
        best
    }

    /// One-step update toward `reward + gamma * max_a Q(next_state, a)`.
    pub fn update(&mut self, state: State, next_state: State, reward: f64, kind: ActionKind) {
        let future = self.table.max_value(next_state);
        self.apply(state, kind, reward, future);
    }

    /// One-step update of the pending decision toward the observed
    /// `next_state`, consuming it. Returns `false` when nothing is pending.
    pub fn learn_transition(&mut self, next_state: State, reward: f64) -> bool {
        let Some(decision) = self.last_decision.take() else {
            return false;
        };
        self.update(decision.state, next_state, reward, decision.kind);
        true
    }

    /// Credits `reward` to the last decision with no future term, consuming it.
    /// Returns `false` when the unit never decided anything.
    pub fn terminal_update(&mut self, reward: f64) -> bool {
        let Some(decision) = self.last_decision.take() else {
            return false;
        };
        self.apply(decision.state, decision.kind, reward, 0.0);
        true
    }

    fn apply(&mut self, state: State, kind: ActionKind, reward: f64, future: f64) {
        let LearningParams { alpha, gamma, .. } = self.params;
        let current = self.table.get(state, kind);
        let updated = current + alpha * (reward + gamma * future - current);
        self.table.set(state, kind, updated);
    }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn learner(epsilon: f64) -> QLearner {
        QLearner::new(QTable::zeros(), LearningParams { epsilon, ..LearningParams::default() })
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn update_moves_value_toward_bootstrapped_target() {
        let mut learner = learner(0.0);
        let state = State::new(1, 4);
        let next = State::new(2, 3);
        learner.table.set(next, ActionKind::Item, 0.5);

        learner.update(state, next, 1.0, ActionKind::Attack);
        assert!(close(learner.table().get(state, ActionKind::Attack), 0.13));
    }

    #[test]
    fn future_value_ignores_feasibility_at_next_state() {
        let mut learner = learner(0.0);
        let state = State::new(0, 9);
        let next = State::new(0, 8);
        learner.table.set(next, ActionKind::Attack, 2.0);

        learner.update(state, next, 0.0, ActionKind::Wait);
        assert!(close(learner.table().get(state, ActionKind::Wait), 0.1 * 0.6 * 2.0));
    }

    #[test]
    fn terminal_update_uses_no_future_term_and_consumes_the_decision() {
        let mut learner = learner(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let state = State::new(3, 2);
        learner.table.set(state, ActionKind::Wait, 0.2);
        learner.table.set(State::new(0, 0), ActionKind::Wait, 100.0);

        let decision = learner.select(state, ActionMask::new(true, true), &mut rng);
        assert_eq!(decision.kind, ActionKind::Wait);

        assert!(learner.terminal_update(-1.0));
        assert!(close(learner.table().get(state, ActionKind::Wait), 0.08));
        assert!(!learner.terminal_update(-1.0), "decision is consumed once");
        assert!(close(learner.table().get(state, ActionKind::Wait), 0.08));
    }

    #[test]
    fn a_decision_credited_by_transition_gets_no_terminal_update() {
        let mut learner = learner(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let state = State::new(2, 4);
        learner.table.set(State::new(1, 4), ActionKind::Item, 1.0);

        let decision = learner.select(state, ActionMask::new(true, true), &mut rng);
        assert_eq!(decision.kind, ActionKind::Wait);

        assert!(learner.learn_transition(State::new(1, 4), 0.5));
        let credited = learner.table().get(state, ActionKind::Wait);
        assert!(close(credited, 0.1 * (0.5 + 0.6 * 1.0)));
        assert_eq!(learner.last_decision(), None);

        assert!(!learner.learn_transition(State::new(1, 4), 0.5));
        assert!(!learner.terminal_update(1.0));
        assert_eq!(learner.table().get(state, ActionKind::Wait), credited);
    }

    #[test]
    fn exploit_takes_first_maximum_among_feasible_actions() {
        let mut learner = learner(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let state = State::new(1, 1);
        learner.table.set(state, ActionKind::Wait, 0.4);
        learner.table.set(state, ActionKind::Item, 0.4);
        learner.table.set(state, ActionKind::Attack, 9.0);

        let masked = learner.select(state, ActionMask::new(false, true), &mut rng);
        assert_eq!(masked.kind, ActionKind::Wait);
        assert_eq!(masked.mode, DecisionMode::Exploit);

        let open = learner.select(state, ActionMask::default(), &mut rng);
        assert_eq!(open.kind, ActionKind::Attack);
    }

    #[test]
    fn threat_counts_beyond_the_table_share_the_last_slot() {
        let mut table = QTable::zeros();
        table.set(State::new(14, 3), ActionKind::Item, 1.5);
        assert_eq!(table.get(State::new(9, 3), ActionKind::Item), 1.5);
    }

    #[test]
    fn wrong_shape_is_rejected_rather_than_reshaped() {
        let err = QTable::from_values(&[10, 10, 4], vec![0.0; 400]).unwrap_err();
        assert!(matches!(err, QTableError::ShapeMismatch { .. }));
        assert!(QTable::from_values(&[10, 10, 3], vec![0.0; 299]).is_err());
        assert!(QTable::from_values(&TABLE_SHAPE, vec![0.25; 300]).is_ok());
    }

    fn mask_strategy() -> impl Strategy<Value = ActionMask> {
        (any::<bool>(), any::<bool>()).prop_map(|(item, attack)| ActionMask::new(item, attack))
    }

    proptest! {
        #[test]
        fn selection_never_returns_a_masked_action(
            seed in any::<u64>(),
            mask in mask_strategy(),
            epsilon in prop_oneof![Just(0.0), Just(1.0)],
            values in vec(-5.0f64..5.0, 3),
        ) {
            let mut learner = learner(epsilon);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let state = State::new(2, 5);
            for (kind, value) in ActionKind::ALL.into_iter().zip(values) {
                learner.table.set(state, kind, value);
            }
            for _ in 0..25 {
                let decision = learner.select(state, mask, &mut rng);
                prop_assert!(!mask.is_masked(decision.kind));
            }
        }
    }
}
