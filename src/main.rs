use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use gridvalue::agent::Move;
use gridvalue::config::SimulationConfig;
use gridvalue::simulation::{Simulation, Snapshot};


/// Command line argument parser.
#[derive(Parser, Debug)]
#[command(about = "Solve a stochastic grid world by value iteration", long_about = None)]
pub struct Args {
    /// Path to a TOML configuration file. Defaults to the classic 4x3 world.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}


#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the grid layout.
    Grid,
    /// Apply N simulation steps and print the resulting state.
    Iterate { n: u64 },
    /// Value-iterate to convergence and print utilities and policy.
    Solve,
    /// Step until the agent reaches a terminal.
    Run {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1000)]
        max_steps: u64,
    },
}


/// `RUST_LOG` when it is set and parses, `gridvalue=info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("gridvalue=info"))
}


fn init_logging() {
    let directives = std::env::var("RUST_LOG").ok();
    fmt().with_env_filter(log_filter(directives.as_deref())).init();
}


fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "reading configuration file");
            SimulationConfig::from_file(path)?
        }
        None => SimulationConfig::default(),
    };
    let mut sim = Simulation::new(config)?;
    let mut rng = StdRng::from_entropy();

    match args.command {
        Commands::Grid => {
            print!("{}", sim.grid());
        }
        Commands::Iterate { n } => {
            for _ in 0..n {
                sim.step(&mut rng);
            }
            show_snapshot(&sim.snapshot());
        }
        Commands::Solve => {
            show_snapshot(&sim.solve());
        }
        Commands::Run { seed, max_steps } => {
            if let Some(seed) = seed {
                rng = StdRng::seed_from_u64(seed);
            }
            for _ in 0..max_steps {
                let snap = sim.step(&mut rng);
                if let Some(Move::Moved { slip, from, to }) = snap.last_move {
                    println!("{:>4}: {from} -> {to} ({slip:?})", snap.agent.step_count);
                }
                if snap.agent.at_terminal {
                    break;
                }
            }
            show_snapshot(&sim.snapshot());
        }
    }
    Ok(())
}


fn show_snapshot(snap: &Snapshot) {
    println!("\n=== Utilities (iteration {}, delta {:.5}) ===",
             snap.iteration_count(), snap.utilities.delta_max());
    print!("{}", snap.utilities);
    println!("\n=== Policy{} ===", if snap.policy.is_optimal { " (optimal)" } else { "" });
    print!("{}", snap.policy);
    println!("\nConverged: {}", snap.has_converged());
    println!("Agent: {} after {} steps{}",
             snap.agent.position, snap.agent.step_count,
             if snap.agent.at_terminal { ", at terminal" } else { "" });
}
