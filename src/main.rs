//! Arc Architect - Entry Point
//!
//! Sets up logging and the async runtime, builds the LLM-backed decision
//! service, then either runs a fixed number of auto ticks or opens an
//! interactive loop for driving the architect by hand.

use arc_architect::core::config::ArchitectConfig;
use arc_architect::core::error::Result;
use arc_architect::llm::{DecisionService, LlmClient};
use arc_architect::simulation::{Simulation, TickOutcome};
use arc_architect::ui::{knowledge_panel, log_panel, plan_panel, stats_panel};

use chrono::Utc;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

/// Log entries shown after each tick
const RECENT_LOGS: usize = 6;

#[derive(Parser, Debug)]
#[command(name = "arc-architect")]
#[command(about = "Let an LLM architect grow a settlement on procedural terrain")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run this many ticks in auto mode, print the final state, then exit
    #[arg(long)]
    auto: Option<u64>,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("arc_architect=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ArchitectConfig::load(path)?,
        None => ArchitectConfig::from_env(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;

    let client = LlmClient::from_config(&config.llm);
    if !client.has_credentials() {
        tracing::warn!("LLM_API_KEY not set - every decision will fall back to WAIT");
    }
    tracing::info!(model = client.model(), "Arc Architect starting...");

    let sim = Simulation::new(DecisionService::new(client, config.clone()), config);

    if let Some(ticks) = args.auto {
        let ran = sim.run_auto(Some(ticks)).await;
        let state = sim.snapshot().await;
        println!("Completed {} ticks.", ran);
        print!("{}", stats_panel(&state));
        print!("{}", plan_panel(&state));
        print!("{}", knowledge_panel(&state));
        print!("{}", log_panel(&state, RECENT_LOGS * 2));
        return Ok(());
    }

    println!("\n=== ARC ARCHITECT ===");
    println!("An autonomous architect building on procedural terrain");
    println!();
    println!("Commands:");
    println!("  tick / t        - Ask the architect for one decision");
    println!("  auto <n>        - Run n ticks in auto mode");
    println!("  status / s      - Show settlement stats");
    println!("  plan / p        - Show the construction plan");
    println!("  knowledge / k   - Show the knowledge base");
    println!("  logs / l        - Show the full activity log");
    println!("  goal <text>     - Replace the current goal");
    println!("  purge           - Forget knowledge and logs (buildings stay)");
    println!("  quit / q        - Exit");
    println!();

    let stdin = io::stdin();
    loop {
        print!("{}", stats_panel(&sim.snapshot().await));
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "" => continue,
            "quit" | "q" => break,
            "tick" | "t" => {
                match sim.tick().await {
                    TickOutcome::Skipped => println!("A tick is already running."),
                    outcome => tracing::debug!(?outcome, "manual tick"),
                }
                print!("{}", log_panel(&sim.snapshot().await, RECENT_LOGS));
            }
            "status" | "s" => {
                let state = sim.snapshot().await;
                print!("{}", stats_panel(&state));
                print!("{}", plan_panel(&state));
            }
            "plan" | "p" => print!("{}", plan_panel(&sim.snapshot().await)),
            "knowledge" | "k" => print!("{}", knowledge_panel(&sim.snapshot().await)),
            "logs" | "l" => print!("{}", log_panel(&sim.snapshot().await, usize::MAX)),
            "purge" => {
                sim.update(|s| s.purge()).await;
                println!("Knowledge and logs purged.");
            }
            _ => {
                if let Some(n) = input.strip_prefix("auto ") {
                    match n.trim().parse::<u64>() {
                        Ok(n) => {
                            println!("Running {} ticks...", n);
                            let ran = sim.run_auto(Some(n)).await;
                            println!("Completed {} ticks.", ran);
                            print!("{}", log_panel(&sim.snapshot().await, RECENT_LOGS));
                        }
                        Err(_) => println!("Usage: auto <number>"),
                    }
                } else if let Some(goal) = input.strip_prefix("goal ") {
                    let goal = goal.trim().to_string();
                    sim.update(|s| s.with_goal(goal, Utc::now())).await;
                } else {
                    println!(
                        "Unknown command. Available: tick, auto <n>, status, plan, knowledge, logs, goal <text>, purge, quit"
                    );
                }
            }
        }
    }

    let state = sim.snapshot().await;
    println!(
        "\nGoodbye! Final state: {} objects, tier {}.",
        state.stats.total_blocks, state.stats.tier
    );
    Ok(())
}
