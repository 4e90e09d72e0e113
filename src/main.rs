//! Weighted Life CLI - Run a headless simulation from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::time::Instant;

use weighted_life::{
    compute::{Simulation, SimulationEvent},
    schema::SimulationConfig,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return;
    }

    if args.get(1).is_some_and(|a| a == "--example") {
        print_example_config();
        return;
    }

    let config = match args.get(1) {
        Some(path) => SimulationConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {}", path, e);
            std::process::exit(1);
        }),
        None => SimulationConfig::default(),
    };
    let generations: u64 = match args.get(2) {
        Some(s) => s.parse().unwrap_or_else(|e| {
            eprintln!("Invalid generation count {:?}: {}", s, e);
            std::process::exit(1);
        }),
        None => 1000,
    };

    println!("Weighted Life Simulation");
    println!("========================");
    println!(
        "Grid: {}x{} ({} cells)",
        config.width,
        config.height,
        config.grid_size()
    );
    println!("Fill ratio: {}", config.fill_ratio);
    println!("Generations per rule: {}", config.generations_per_rule);
    println!("Search threshold: {}", config.search.threshold);
    println!("Generations: {}", generations);
    println!();

    let mut simulation = Simulation::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Initial state:");
    println!("  Live cells: {}", simulation.grid().live_count());
    println!("  Rule: {:?}", simulation.rule());
    println!();

    println!("Running simulation...");
    let start = Instant::now();
    let mut total_births = 0u64;

    for i in 0..generations {
        let report = simulation.tick();
        total_births += report.births;

        for event in &report.events {
            print_event(report.generation, event);
        }

        // Print progress every 10%
        if (i + 1) % (generations / 10).max(1) == 0 {
            let elapsed = start.elapsed().as_secs_f32();
            println!(
                "  Generation {}/{}: alive={}, births={}, {:.1} gen/s",
                i + 1,
                generations,
                report.live_count,
                report.births,
                (i + 1) as f32 / elapsed
            );
        }
    }

    let elapsed = start.elapsed();
    let grid = simulation.grid();

    println!();
    println!("Final state:");
    println!("  Live cells: {}", grid.live_count());
    println!("  Density: {:.4}", grid.live_count() as f64 / grid.size() as f64);
    println!("  Total births: {}", total_births);
    println!("  Rule: {:?}", simulation.rule());
    println!();
    println!(
        "Time: {:.2}s ({:.1} gen/s)",
        elapsed.as_secs_f32(),
        generations as f32 / elapsed.as_secs_f32()
    );

    simulation.shutdown();
}

fn print_event(generation: u64, event: &SimulationEvent) {
    match event {
        SimulationEvent::RuleSwitched {
            rule,
            score,
            stop_reason,
        } => println!(
            "  [{}] Switched rule (score {:.4}, {:?}): {:?}",
            generation, score, stop_reason, rule
        ),
        SimulationEvent::Extinct => println!("  [{}] Extinct", generation),
        SimulationEvent::Reseeded => println!("  [{}] Reseeded", generation),
        SimulationEvent::SearchFailed(e) => {
            println!("  [{}] Rule search failed: {}", generation, e)
        }
        // Logged by the driver; too frequent to print
        SimulationEvent::SwitchDeferred | SimulationEvent::PaletteRefreshed => {}
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json] [generations]", program);
    eprintln!();
    eprintln!("Run a Weighted Life simulation from JSON configuration.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to simulation configuration file (default: built-in)");
    eprintln!("  generations  Number of generations to run (default: 1000)");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn print_example_config() {
    let config = SimulationConfig::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => {
            println!("Example configuration (config.json):");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
