use skirmish_core::{Battle, BattleConfig, BattleEvent, MemoryQTableStore, Scenario, StepOutcome};

fn run(seed: u64) -> (StepOutcome, u64, Vec<BattleEvent>) {
    let scenario = Scenario::skirmish();
    let store = MemoryQTableStore::new();
    let mut battle =
        Battle::from_scenario(&scenario, BattleConfig::default(), Box::new(store), seed)
            .expect("built-in scenario should build");
    let outcome = battle.run_to_end().expect("battle should run to an outcome");
    (outcome, battle.snapshot_hash(), battle.log().to_vec())
}

#[test]
fn test_determinism_identical_seeds_produce_same_hash() {
    let (outcome1, hash1, log1) = run(12345);
    let (outcome2, hash2, log2) = run(12345);

    assert_eq!(hash1, hash2, "Identical runs must produce identical hashes");
    assert_eq!(outcome1, outcome2);
    assert_eq!(log1, log2);
}

#[test]
fn test_determinism_different_seeds_produce_different_hashes() {
    let (_, hash1, _) = run(123);
    let (_, hash2, _) = run(456);

    assert_ne!(hash1, hash2, "Different seeds should produce different hashes");
}

#[test]
fn test_determinism_shared_tables_replay_identically() {
    let scenario = Scenario::skirmish();
    let trace = |seed: u64| {
        let store = MemoryQTableStore::new();
        let mut hashes = Vec::new();
        for episode in 0..3 {
            let mut battle = Battle::from_scenario(
                &scenario,
                BattleConfig::default(),
                Box::new(store.clone()),
                seed + episode,
            )
            .expect("built-in scenario should build");
            battle.run_to_end().expect("battle should run to an outcome");
            hashes.push(battle.snapshot_hash());
        }
        hashes
    };

    assert_eq!(trace(77), trace(77));
}
