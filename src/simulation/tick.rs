//! Arena tick - advances every agent one fixed step
//!
//! Order per tick: threat decay, formation rebalance (rate-limited), then
//! each live agent in spawn order: awareness (staggered), archetype upkeep,
//! intent selection, movement, attacks. Alerts raised by an agent are
//! delivered before the next agent updates.
//!
//! A failing agent is logged and skipped; it never stops the tick.

use std::f32::consts::TAU;

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use crate::core::config::AiConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{flat, horizontal_distance, SimTime, Tick};
use crate::navigation::planner::PathPlanner;
use crate::simulation::agent::Agent;
use crate::simulation::arena::Arena;
use crate::simulation::events::AgentEvent;
use crate::spatial::collision::CollisionOracle;
use crate::squad::coordinator::SquadCoordinator;
use crate::tactics::archetype::{Archetype, ArchetypeState};
use crate::tactics::awareness::{has_line_of_sight, update_awareness, EYE_HEIGHT};
use crate::tactics::cover::{find_cover, CoverProbe};
use crate::tactics::intent::{select_intent, Intent, TacticalInputs};
use crate::tactics::maneuver::{clamp_to_arena, evasion_heading, resolve_step, step_towards, BodyShape};
use crate::tactics::policy::{drone_altitude, fire_cooldown, move_order, ranged_standoff, MoveContext};
use crate::tactics::state::FormationRole;

/// Read-only view of the arena for one tick
pub struct TickContext<'a> {
    pub config: &'a AiConfig,
    pub oracle: Option<&'a dyn CollisionOracle>,
    pub planner: &'a dyn PathPlanner,
    pub player: Vec3,
    pub now: SimTime,
    pub dt: f32,
    pub tick: Tick,
}

/// What one agent produced this tick
#[derive(Debug, Default)]
pub struct AgentUpdate {
    pub events: Vec<AgentEvent>,
    /// Sighting should be broadcast to nearby agents
    pub broadcast: bool,
}

/// Run one arena tick
pub fn run_arena_tick(arena: &mut Arena) -> Vec<AgentEvent> {
    arena.clock.advance();
    let now = arena.clock.now();
    let tick = arena.clock.current_tick();

    arena.coordinator.update(now);
    arena
        .coordinator
        .rebalance_formations(&mut arena.agents, arena.player_position, now);

    let ctx = TickContext {
        config: &arena.config,
        oracle: arena.oracle.as_deref(),
        planner: arena.planner.as_ref(),
        player: arena.player_position,
        now,
        dt: arena.clock.dt(),
        tick,
    };

    let mut events = Vec::new();
    for index in 0..arena.agents.len() {
        if !arena.agents[index].is_alive() {
            continue;
        }

        let id = arena.agents[index].id;
        match update_agent(&mut arena.agents[index], &mut arena.coordinator, &mut arena.rng, &ctx) {
            Ok(update) => {
                events.extend(update.events);
                if update.broadcast {
                    let source_position = arena.agents[index].position;
                    let alerted =
                        arena
                            .coordinator
                            .alert_nearby_agents(id, source_position, ctx.player, &mut arena.agents, now);
                    if !alerted.is_empty() {
                        events.push(AgentEvent::AlertRaised {
                            source: id,
                            tick,
                            alerted,
                        });
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping {} this tick: {}", id, e);
                events.push(AgentEvent::AgentFault {
                    agent: id,
                    tick,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !events.is_empty() {
        tracing::trace!("Tick {}: {} events", tick, events.len());
    }
    events
}

/// Advance a single agent
pub fn update_agent(
    agent: &mut Agent,
    coordinator: &mut SquadCoordinator,
    rng: &mut ChaCha8Rng,
    ctx: &TickContext<'_>,
) -> Result<AgentUpdate> {
    validate_agent(agent)?;

    let config = ctx.config;
    let tactics = &config.tactics;
    let mut update = AgentUpdate::default();

    agent.tick_counter += 1;
    agent.ai.tick_cooldowns();
    agent.attack_cooldown = agent.attack_cooldown.saturating_sub(1);

    // Awareness and cover search are staggered across agents
    let sensing_tick = agent.tick_counter % config.awareness.update_interval_ticks == 0;
    if sensing_tick {
        let outcome = update_awareness(
            &mut agent.ai,
            &mut agent.tracker,
            agent.position,
            ctx.player,
            ctx.now,
            ctx.oracle,
            &config.awareness,
        );
        agent.target_visible = outcome.visible;
        update.broadcast = outcome.broadcast;
    }

    let threat = coordinator.threat_level();
    let health_ratio = agent.health_ratio();
    let target = agent.ai.last_known_player_position;
    let distance = target.map_or(f32::INFINITY, |t| horizontal_distance(agent.position, t));

    if let ArchetypeState::Scout { flank_angle } = &mut agent.archetype_state {
        *flank_angle = (*flank_angle + tactics.scout_flank_rate).rem_euclid(TAU);
    }
    agent.refresh_shield(tactics);

    update_cover(agent, target, health_ratio, sensing_tick, ctx);

    let standoff = ranged_standoff(threat, tactics);
    let inputs = TacticalInputs {
        archetype: agent.archetype,
        aware: agent.ai.is_aware(),
        distance,
        health_ratio,
        alert_level: agent.ai.alert_level(),
        standoff,
        has_cover: agent.ai.cover_position().is_some(),
        holding_cover: agent.ai.cover_hold > 0,
        evading: agent.ai.evasion_cooldown > 0,
        exploder_triggered: agent.archetype_state.is_triggered(),
        tick: agent.tick_counter,
    };
    let intent = select_intent(&inputs, tactics);
    if intent != agent.intent {
        tracing::trace!("{} {:?} -> {:?}", agent.id, agent.intent, intent);
        update.events.push(AgentEvent::IntentChanged {
            agent: agent.id,
            tick: ctx.tick,
            from: agent.intent,
            to: intent,
        });
        agent.intent = intent;
    }

    if let Some(target) = target {
        move_agent(agent, coordinator, rng, target, standoff, ctx);
    }

    if agent.archetype == Archetype::Drone {
        agent.position.y = drone_altitude(intent, ctx.now, agent.bob_phase, tactics);
    }

    act(agent, threat, distance, ctx, &mut update);

    Ok(update)
}

fn validate_agent(agent: &Agent) -> Result<()> {
    if !agent.position.is_finite() {
        return Err(ArenaError::InvalidAgentState {
            agent: agent.id,
            reason: format!("non-finite position {:?}", agent.position),
        });
    }
    if !agent.health.is_finite() {
        return Err(ArenaError::InvalidAgentState {
            agent: agent.id,
            reason: format!("non-finite health {}", agent.health),
        });
    }
    Ok(())
}

/// Find cover when hurt, and start holding once it is reached
fn update_cover(agent: &mut Agent, target: Option<Vec3>, health_ratio: f32, sensing_tick: bool, ctx: &TickContext<'_>) {
    let tactics = &ctx.config.tactics;
    let wants_cover = match agent.archetype {
        Archetype::Heavy => health_ratio < tactics.heavy_cover_health,
        Archetype::Ranged => health_ratio < tactics.ranged_retreat_health,
        _ => false,
    };
    if !wants_cover {
        agent.ai.clear_cover();
        return;
    }

    if let Some(cover) = agent.ai.cover_position() {
        if horizontal_distance(agent.position, cover) <= tactics.cover_arrival_distance {
            agent.ai.clear_cover();
            agent.ai.cover_hold = tactics.cover_hold_ticks;
            agent.follower.clear();
        }
        return;
    }

    if sensing_tick && agent.ai.cover_hold == 0 {
        if let Some(target) = target {
            let probe = CoverProbe {
                radius: ctx.config.arena.probe_radius,
                height: ctx.config.arena.probe_height,
            };
            if let Some(cover) = find_cover(ctx.oracle, agent.position, target, probe, tactics) {
                tracing::debug!("{} taking cover at {:?}", agent.id, cover);
                agent.ai.set_cover(cover);
            }
        }
    }
}

fn move_agent(
    agent: &mut Agent,
    coordinator: &mut SquadCoordinator,
    rng: &mut ChaCha8Rng,
    target: Vec3,
    standoff: f32,
    ctx: &TickContext<'_>,
) {
    let config = ctx.config;
    let tactics = &config.tactics;
    let intent = agent.intent;

    let evasion = if intent == Intent::Evade {
        Some(evasion_heading(&mut agent.ai, target - agent.position, rng, tactics))
    } else {
        None
    };

    let flank_angle = match agent.archetype_state {
        ArchetypeState::Scout { flank_angle } => flank_angle,
        _ => 0.0,
    };
    let move_ctx = MoveContext {
        position: agent.position,
        target,
        cover: agent.ai.cover_position(),
        evasion_heading: evasion,
        flank_angle,
        standoff,
        flying: agent.stats.flying,
    };

    let Some(order) = move_order(intent, &move_ctx, tactics) else {
        face_target(agent, target);
        return;
    };

    let mut destination = order.destination;
    if matches!(intent, Intent::Engage | Intent::Flank) && agent.ai.formation_role.in_formation() {
        if agent.ai.cooperation_cooldown == 0 || agent.formation_target.is_none() {
            agent.formation_target = coordinator.get_formation_position(agent.id, agent.position, target);
            agent.ai.cooperation_cooldown = config.squad.formation_interval_ticks as u32;
        }
        if let Some(slot) = agent.formation_target {
            if agent.ai.formation_role != FormationRole::Leader {
                destination = destination.lerp(slot, config.squad.formation_blend);
            }
        }
    } else {
        agent.formation_target = None;
    }

    let steer_to = if order.pathable
        && horizontal_distance(agent.position, destination) > config.pathing.path_distance_threshold
    {
        agent
            .follower
            .steer(ctx.planner, agent.position, destination, ctx.now, &config.pathing)
    } else {
        destination
    };

    let step = step_towards(agent.position, steer_to, agent.stats.speed * order.speed_scale * ctx.dt);
    if step.length_squared() <= f32::EPSILON {
        face_target(agent, target);
        return;
    }

    let next = if agent.stats.flying {
        Some(agent.position + step)
    } else {
        let body = BodyShape {
            radius: config.arena.agent_radius,
            height: config.arena.agent_height,
        };
        resolve_step(ctx.oracle, agent.position, step, body, tactics)
    };

    if let Some(next) = next {
        let moved = clamp_to_arena(next, config.arena.half_extent, config.arena.agent_radius);
        let heading = flat(moved - agent.position).normalize_or_zero();
        agent.position = moved;
        if heading != Vec3::ZERO {
            agent.facing = heading;
        }
    }

    // Shields always point at the threat
    if agent.archetype == Archetype::Shielded {
        face_target(agent, target);
    }
}

fn face_target(agent: &mut Agent, target: Vec3) {
    let heading = flat(target - agent.position).normalize_or_zero();
    if heading != Vec3::ZERO {
        agent.facing = heading;
    }
}

/// Attacks, shots and detonations
fn act(agent: &mut Agent, threat: f32, distance: f32, ctx: &TickContext<'_>, update: &mut AgentUpdate) {
    let tactics = &ctx.config.tactics;

    if agent.intent == Intent::Detonate {
        if let ArchetypeState::Exploder { triggered } = &mut agent.archetype_state {
            if !*triggered {
                *triggered = true;
                agent.health = 0.0;
                tracing::debug!("{} detonated at {:?}", agent.id, agent.position);
                update.events.push(AgentEvent::Detonated {
                    agent: agent.id,
                    tick: ctx.tick,
                    position: agent.position,
                    radius: tactics.exploder_blast_radius,
                    damage: agent.stats.damage,
                });
            }
        }
        return;
    }

    if agent.attack_cooldown > 0 || !agent.ai.is_aware() {
        return;
    }

    match agent.archetype {
        Archetype::Ranged => {
            if !matches!(agent.intent, Intent::Engage | Intent::Hold | Intent::Retreat) {
                return;
            }
            if horizontal_distance(agent.position, ctx.player) > tactics.ranged_max_range {
                return;
            }
            let origin = agent.position + Vec3::Y * EYE_HEIGHT;
            let aim = agent
                .tracker
                .predict(ctx.config.awareness.lookahead)
                .unwrap_or(ctx.player);
            if !has_line_of_sight(
                ctx.oracle,
                origin,
                ctx.player + Vec3::Y * EYE_HEIGHT,
                ctx.config.awareness.los_step,
                ctx.config.awareness.los_probe_radius,
            ) {
                return;
            }
            update.events.push(AgentEvent::FireProjectile {
                agent: agent.id,
                tick: ctx.tick,
                origin,
                aim,
                damage: agent.stats.damage,
            });
            agent.attack_cooldown = fire_cooldown(threat, ctx.config.threat.max, tactics);
        }
        Archetype::Exploder => {}
        _ => {
            let reach = agent.stats.attack_range;
            let player_distance = horizontal_distance(agent.position, ctx.player);
            if distance <= reach && player_distance <= reach {
                update.events.push(AgentEvent::Attack {
                    agent: agent.id,
                    tick: ctx.tick,
                    damage: agent.stats.damage,
                });
                agent.attack_cooldown = agent.stats.attack_cooldown_ticks;
            }
        }
    }
}
