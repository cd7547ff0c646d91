use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    ActionKind, Battle, BattleConfig, BattleEvent, CombatResolver, CombatResult, CombatSummary,
    FileQTableStore, MapService, ParticipantSummary, Pos, QTableKey, QTableStore, RewardParams,
    Scenario, Side, Stats, StepOutcome, Unit, UnitTemplate, content::keys,
};

/// Every exchange ends with the defender dead.
struct AttackerAlwaysWins;

impl CombatResolver for AttackerAlwaysWins {
    fn summary_at(&self, _: &Unit, _: Pos, _: &Unit, _: &dyn MapService) -> CombatSummary {
        let side = ParticipantSummary {
            hit_chance: 1.0,
            might: 10,
            crit_chance: 0.0,
            doubling: false,
            can_strike: true,
        };
        CombatSummary { attacker: side, defender: side }
    }

    fn simulate(
        &self,
        _summary: &CombatSummary,
        _attacker: &mut Unit,
        defender: &mut Unit,
        _rng: &mut ChaCha8Rng,
    ) -> CombatResult {
        defender.take_damage(defender.hp);
        CombatResult::DefenderDeath
    }
}

fn template(name: &str, job: u16, pos: Pos, item: u16) -> UnitTemplate {
    UnitTemplate {
        character_code: 0,
        name: name.to_string(),
        job,
        pos,
        stats: Stats {
            max_hp: 20,
            strength: 5,
            magic: 0,
            skill: 5,
            speed: 5,
            luck: 0,
            defense: 0,
            resistance: 0,
        },
        inventory: vec![item],
        terminal: false,
        learning: false,
    }
}

fn key(name: &str, config: &BattleConfig) -> QTableKey {
    QTableKey {
        unit_name: name.to_string(),
        version: config.table_version.clone(),
        run_name: config.run_name.clone(),
        alpha: config.learning.alpha,
        gamma: config.learning.gamma,
    }
}

#[test]
fn test_terminal_defender_death_ends_the_episode_for_blue() {
    let mut boss = template("Boss", keys::JOB_BRIGAND, Pos::new(3, 0), keys::ITEM_IRON_AXE);
    boss.terminal = true;
    let scenario = Scenario {
        map: vec!["......".to_string()],
        blue: vec![template("Lyn", keys::JOB_LORD, Pos::new(0, 0), keys::ITEM_IRON_SWORD)],
        red: vec![
            boss,
            template("Guard", keys::JOB_BRIGAND, Pos::new(5, 0), keys::ITEM_IRON_AXE),
        ],
    };
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let mut battle = Battle::new(
        &scenario,
        BattleConfig::default(),
        Box::new(scenario.grid_map().expect("lane map should parse")),
        Box::new(AttackerAlwaysWins),
        Box::new(FileQTableStore::new(dir.path())),
        3,
    )
    .expect("scenario should build");

    assert_eq!(battle.step().expect("first activation should apply"), StepOutcome::BlueWins);
    assert_eq!(
        battle.roster(Side::Red).len(),
        2,
        "terminal death ends the battle without shrinking the roster"
    );
    assert!(matches!(
        battle.log().last(),
        Some(BattleEvent::Finished { outcome: StepOutcome::BlueWins, turn: 0 })
    ));
}

#[test]
fn test_training_episodes_persist_and_reload_tables() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let scenario = Scenario::skirmish();
    // A step cost makes every learned transition move the table.
    let config = BattleConfig {
        run_name: "episodes".to_string(),
        rewards: RewardParams { step: -0.01, ..RewardParams::default() },
        ..BattleConfig::default()
    };

    for seed in 0..3 {
        let store = FileQTableStore::new(dir.path());
        let mut battle = Battle::from_scenario(&scenario, config.clone(), Box::new(store), seed)
            .expect("built-in scenario should build");
        battle.run_to_end().expect("battle should run to an outcome");
    }

    let store = FileQTableStore::new(dir.path());
    for name in ["Lyn", "Raven"] {
        let key = key(name, &config);
        assert!(store.path_for(&key).exists(), "{name} table should be saved");
        let table = store.load(&key).expect("saved table should reload");
        assert!(table.values().iter().any(|value| *value != 0.0), "{name} should have learned");
    }
    assert_eq!(
        key("Lyn", &config).file_name(),
        "Lyn_qtable_v5_episodes_0.1-0.6.json".to_string()
    );
}

#[test]
fn test_learned_preference_survives_between_runs() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let mut lyn = template("Lyn", keys::JOB_LORD, Pos::new(0, 0), keys::ITEM_IRON_SWORD);
    lyn.learning = true;
    lyn.terminal = true;
    let scenario = Scenario {
        map: vec!["...".to_string()],
        blue: vec![lyn],
        red: vec![template("Brigand", keys::JOB_BRIGAND, Pos::new(2, 0), keys::ITEM_IRON_AXE)],
    };
    let mut config = BattleConfig::default();
    config.learning.epsilon = 1.0;

    let mut saw_attack = false;
    for seed in 0..20 {
        let mut battle = Battle::new(
            &scenario,
            config.clone(),
            Box::new(scenario.grid_map().expect("lane map should parse")),
            Box::new(AttackerAlwaysWins),
            Box::new(FileQTableStore::new(dir.path())),
            seed,
        )
        .expect("scenario should build");
        battle.run_to_end().expect("battle should run to an outcome");
        saw_attack |= battle.outcome() == StepOutcome::BlueWins;
    }
    assert!(saw_attack, "twenty random first moves should include an attack");

    let table = FileQTableStore::new(dir.path())
        .load(&key("Lyn", &config))
        .expect("table should load");
    let best_attack = table.values().iter().skip(ActionKind::Attack.index()).step_by(3).fold(
        f64::NEG_INFINITY,
        |best, value| best.max(*value),
    );
    assert!(best_attack > 0.0, "winning attacks should carry positive value");
}
