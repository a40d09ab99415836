//! Durability simulator
//!
//! Loads a durability config and item database, builds a party, and runs
//! seeded rounds of battle wear against every member. Prints a summary of
//! durability totals and every break that happened.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use equip_durability::breakage::{BreakReport, Surfaces, TracingSurface};
use equip_durability::core::config::DurabilityConfig;
use equip_durability::core::error::Result;
use equip_durability::core::types::UsableRef;
use equip_durability::data::database::Database;
use equip_durability::engine::DurabilityEngine;
use equip_durability::equipment::host::EquipHost;
use equip_durability::party::{Party, PartySnapshot};

/// Run seeded battle-wear rounds against a party
#[derive(Parser, Debug)]
#[command(name = "equip-durability")]
#[command(about = "Simulate equipment wear, breakage and salvage for a party")]
struct Args {
    /// Durability config (TOML). Defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Item database (TOML)
    #[arg(long, default_value = "data/database.toml")]
    database: PathBuf,

    /// Actor ids to put in the party, in party order
    #[arg(long, value_delimiter = ',', default_value = "1")]
    members: Vec<u32>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of combat rounds
    #[arg(long, default_value_t = 10)]
    rounds: u32,

    /// Durability change per hit (negative wears)
    #[arg(long, default_value_t = -5.0, allow_hyphen_values = true)]
    magnitude: f64,

    /// Skill every member is hit with each round (sets the incoming element)
    #[arg(long)]
    skill: Option<u32>,

    /// Wear all equips each round instead of one random slot
    #[arg(long)]
    all_slots: bool,

    /// Percent repair applied to the whole party after the last round
    #[arg(long, allow_hyphen_values = true)]
    repair: Option<f64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct SimulationSummary {
    seed: u64,
    rounds: u32,
    total_durability: i64,
    max_durability: i64,
    breaks: Vec<BreakReport>,
    party: PartySnapshot,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("equip_durability=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => DurabilityConfig::load(path)?,
        None => DurabilityConfig::default(),
    };
    let database = Database::load(&args.database)?;
    let mut party = Party::from_database(&database, &args.members)?;

    let surfaces = Surfaces::new()
        .with_messages(TracingSurface)
        .with_audio(TracingSurface);
    let mut engine = DurabilityEngine::new(config, database, seed)?.with_surfaces(surfaces);

    tracing::info!(seed, rounds = args.rounds, members = ?args.members, "Starting durability simulation");

    let mut breaks = Vec::new();
    for round in 0..args.rounds {
        for actor in party.members() {
            if let Some(skill) = args.skill {
                engine.begin_action(&mut party, actor, Some(actor), UsableRef::Skill(skill));
            }
            let reports = if args.all_slots {
                engine.damage_all(&mut party, actor, args.magnitude)
            } else {
                engine.damage_random(&mut party, actor, args.magnitude)
            };
            breaks.extend(reports);
        }
        tracing::debug!(round, total = engine.total_durability(&party, false), "Round complete");
    }

    if let Some(percent) = args.repair {
        breaks.extend(engine.fix_all(&mut party, percent));
    }

    let summary = SimulationSummary {
        seed,
        rounds: args.rounds,
        total_durability: engine.total_durability(&party, false),
        max_durability: engine.total_durability(&party, true),
        breaks,
        party: party.snapshot(),
    };

    if args.format == "text" {
        print_text(&summary);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn print_text(summary: &SimulationSummary) {
    println!("Seed: {}  Rounds: {}", summary.seed, summary.rounds);
    println!(
        "Party durability: {}/{}",
        summary.total_durability, summary.max_durability
    );
    for member in &summary.party.members {
        println!("{} (actor {})", member.name, member.id.0);
        for (slot, equip) in member.equips.iter().enumerate() {
            match equip {
                Some(e) if e.is_unbreakable() => println!("  [{slot}] {} (unbreakable)", e.name),
                Some(e) => println!("  [{slot}] {} {}/{}", e.name, e.durability, e.resolved_max()),
                None => println!("  [{slot}] -"),
            }
        }
    }
    println!("Breaks: {}", summary.breaks.len());
    for report in &summary.breaks {
        println!("  {} ({:?})", report.name, report.policy);
    }
}
