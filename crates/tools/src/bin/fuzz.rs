use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use skirmish_core::{
    Battle, BattleConfig, LearningParams, MemoryQTableStore, Scenario, Side, Terrain,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    episodes: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    fmt().with_env_filter(EnvFilter::new("warn")).with_target(false).init();

    println!("Starting fuzz harness on seed {} for {} episodes...", args.seed, args.episodes);
    let scenario = Scenario::skirmish();
    let map = scenario.grid_map()?;
    let store = MemoryQTableStore::new();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let (mut blue_wins, mut red_wins) = (0u32, 0u32);
    for episode in 0..args.episodes {
        let battle_seed = rng.next_u64();
        // Exploration rate sweeps the full range across episodes.
        let epsilon = (rng.next_u64() % 101) as f64 / 100.0;
        let config = BattleConfig {
            learning: LearningParams { epsilon, ..LearningParams::default() },
            ..BattleConfig::default()
        };
        let mut battle =
            Battle::from_scenario(&scenario, config, Box::new(store.clone()), battle_seed)?;

        loop {
            let outcome = battle.step()?;

            let mut occupied = Vec::new();
            for side in [Side::Blue, Side::Red] {
                for id in battle.roster(side) {
                    let unit = &battle.units()[*id];
                    assert!(
                        unit.hp >= 0 && unit.hp <= unit.stats.max_hp,
                        "Invariant failed: HP out of range"
                    );
                    assert!(
                        map.terrain_at(unit.pos) != Terrain::Wall,
                        "Invariant failed: unit inside wall"
                    );
                    if !unit.is_defeated() {
                        assert!(!occupied.contains(&unit.pos), "Invariant failed: shared tile");
                        occupied.push(unit.pos);
                    }
                }
            }

            if outcome.is_finished() {
                match outcome.winner() {
                    Some(Side::Blue) => blue_wins += 1,
                    Some(Side::Red) => red_wins += 1,
                    None => bail!("finished battle without a winner in episode {episode}"),
                }
                break;
            }
        }
    }

    println!("Fuzzing completed successfully: Blue {blue_wins} / Red {red_wins}.");
    Ok(())
}
