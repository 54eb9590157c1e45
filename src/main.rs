//! Arena Sim - headless arena runner
//!
//! Spawns a mixed squad, moves a scripted player around the arena, and
//! reports what the AI did.

use std::collections::BTreeMap;

use arena_tactics::core::config::{load_config, AiConfig};
use arena_tactics::core::error::Result;
use arena_tactics::simulation::{AgentEvent, Arena};
use arena_tactics::spatial::collision::{BoxGeometry, CollisionOracle};
use arena_tactics::tactics::archetype::Archetype;
use clap::Parser;
use glam::Vec3;
use serde::Serialize;

/// Headless Arena Runner - scripted player against the combat AI
#[derive(Parser, Debug)]
#[command(name = "arena_sim")]
#[command(about = "Run the combat AI against a scripted player and report results")]
struct Args {
    /// AI config file (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<String>,

    /// Number of agents to spawn
    #[arg(long, default_value_t = 12)]
    agents: u32,

    /// Ticks to simulate
    #[arg(long, default_value_t = 1800)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Level layout: open or walls
    #[arg(long, default_value = "walls")]
    layout: String,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    agents_spawned: usize,
    agents_alive: usize,
    final_threat: f32,
    formations: usize,
    events: BTreeMap<&'static str, usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "arena_tactics=debug" } else { "arena_tactics=info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AiConfig::default(),
    };

    let half = config.arena.half_extent;
    let oracle: Box<dyn CollisionOracle> = match args.layout.as_str() {
        "open" => Box::new(BoxGeometry::new(half)),
        _ => Box::new(walled_layout(half)),
    };

    let mut arena = Arena::new(config, Some(oracle), args.seed)?;
    spawn_ring(&mut arena, args.agents, half * 0.6);

    let mut events: BTreeMap<&'static str, usize> = BTreeMap::new();
    for _ in 0..args.ticks {
        let tick = arena.current_tick();
        arena.set_player_position(player_path(tick, arena.config().arena.tick_rate));

        // Scripted player pressure: shoot the nearest live agent periodically
        if tick > 0 && tick % 240 == 0 {
            if let Some(event) = player_attacks(&mut arena, tick / 240)? {
                *events.entry(event_name(&event)).or_default() += 1;
            }
        }

        for event in arena.tick() {
            *events.entry(event_name(&event)).or_default() += 1;
        }
    }

    let summary = RunSummary {
        seed: args.seed,
        ticks: args.ticks,
        agents_spawned: arena.agents().len(),
        agents_alive: arena.live_agent_count(),
        final_threat: arena.coordinator().threat_level(),
        formations: arena.coordinator().formations().len(),
        events,
    };

    match args.format.as_str() {
        "json" => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to serialize summary: {}", e),
        },
        _ => print_text(&summary, &arena),
    }

    Ok(())
}

/// Two walls with a gap, plus a pillar near the center
fn walled_layout(half: f32) -> BoxGeometry {
    let span = half * 0.5;
    BoxGeometry::new(half)
        .with_wall(Vec3::new(-span, 0.0, 12.0), Vec3::new(-3.0, 0.0, 12.0), 1.0, 3.0)
        .with_wall(Vec3::new(3.0, 0.0, 12.0), Vec3::new(span, 0.0, 12.0), 1.0, 3.0)
        .with_wall(Vec3::new(-span, 0.0, -12.0), Vec3::new(span, 0.0, -12.0), 1.0, 3.0)
        .with_box(Vec3::new(-1.5, 0.0, 4.0), Vec3::new(1.5, 3.0, 6.0))
}

fn spawn_ring(arena: &mut Arena, count: u32, radius: f32) {
    for i in 0..count {
        let angle = i as f32 * std::f32::consts::TAU / count.max(1) as f32;
        let position = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        let archetype = Archetype::ALL[i as usize % Archetype::ALL.len()];
        arena.spawn_agent(archetype, position);
    }
}

/// Slow circle around the arena center
fn player_path(tick: u64, tick_rate: f32) -> Vec3 {
    let t = tick as f32 / tick_rate;
    Vec3::new((t * 0.2).cos() * 6.0, 0.0, (t * 0.2).sin() * 6.0)
}

/// Every third volley is a headshot
fn player_attacks(arena: &mut Arena, volley: u64) -> Result<Option<AgentEvent>> {
    let player = arena.player_position();
    let nearest = arena
        .agents()
        .iter()
        .filter(|a| a.is_alive())
        .min_by(|a, b| {
            a.position
                .distance_squared(player)
                .total_cmp(&b.position.distance_squared(player))
        })
        .map(|a| a.id);

    let Some(id) = nearest else {
        return Ok(None);
    };

    let outcome = arena.damage_agent(id, 45.0, player, volley % 3 == 2)?;
    if outcome.killed {
        tracing::info!("Player killed {}", id);
    }
    Ok(outcome.detonation)
}

fn event_name(event: &AgentEvent) -> &'static str {
    match event {
        AgentEvent::Attack { .. } => "attack",
        AgentEvent::FireProjectile { .. } => "fire_projectile",
        AgentEvent::Detonated { .. } => "detonated",
        AgentEvent::AlertRaised { .. } => "alert_raised",
        AgentEvent::IntentChanged { .. } => "intent_changed",
        AgentEvent::AgentFault { .. } => "agent_fault",
    }
}

fn print_text(summary: &RunSummary, arena: &Arena) {
    println!("\n=== ARENA SIM ===");
    println!("Seed: {}  Ticks: {}", summary.seed, summary.ticks);
    println!(
        "Agents alive: {}/{}  Threat: {:.1}  Formations: {}",
        summary.agents_alive, summary.agents_spawned, summary.final_threat, summary.formations
    );

    println!("\n--- Events ---");
    for (name, count) in &summary.events {
        println!("{:>16}: {}", name, count);
    }

    println!("\n--- Agents ---");
    for agent in arena.agents() {
        println!(
            "{:>9} {:<9} hp {:>5.1}  alert {:>5.1}  {:?} {:?}",
            agent.id.to_string(),
            agent.archetype.name(),
            agent.health,
            agent.ai.alert_level(),
            agent.intent,
            agent.ai.formation_role,
        );
    }
}
