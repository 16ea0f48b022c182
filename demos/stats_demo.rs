use std::collections::hash_map::DefaultHasher;
use std::hash::BuildHasherDefault;

use clap::Parser;
use probe_map::HashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const CAPACITY: usize = 4096;

type Map = HashMap<u64, u64, CAPACITY, BuildHasherDefault<DefaultHasher>>;

#[derive(Parser, Debug)]
struct Args {
    /// Percentage of slots to fill
    #[arg(short = 'l', long = "load", default_value_t = 90)]
    load_percent: usize,

    /// Number of remove-then-insert cycles to run after filling
    #[arg(short = 'c', long = "churn", default_value_t = 10_000)]
    churn: usize,

    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    let target = CAPACITY * args.load_percent.min(100) / 100;

    println!("Filling map of capacity {CAPACITY} to {target} elements");

    let mut map = Map::new();
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut num_duplicates = 0;
    while map.len() < target {
        let key = rng.random::<u64>();
        if map.try_insert(key, key).is_err() {
            num_duplicates += 1;
        }
    }

    println!("Rejected {num_duplicates} duplicate keys");
    map.debug_stats().print();

    if map.is_empty() || args.churn == 0 {
        return;
    }

    println!("Running {} remove/insert cycles", args.churn);
    for _ in 0..args.churn {
        let victim = map.keys().nth(rng.random_range(0..map.len())).copied();
        if let Some(victim) = victim {
            map.remove(&victim);
        }

        let key = rng.random::<u64>();
        map.insert_or_assign(key, key);
    }

    map.debug_stats().print();
}
