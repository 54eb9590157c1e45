//! Arena session: agents, player, squad coordinator and level services

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::AiConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{AgentId, SimClock, SimTime, Tick};
use crate::navigation::planner::{planner_for, PathPlanner};
use crate::simulation::agent::Agent;
use crate::simulation::events::AgentEvent;
use crate::simulation::tick::run_arena_tick;
use crate::spatial::collision::CollisionOracle;
use crate::spatial::occupancy::OccupancyGrid;
use crate::squad::coordinator::SquadCoordinator;
use crate::squad::threat::PlayerAction;
use crate::tactics::archetype::{Archetype, ArchetypeState};

/// Offsets the coordinator's stream from the arena's
const COORDINATOR_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of a player hit
#[derive(Debug, Clone)]
pub struct DamageOutcome {
    /// Damage after shield reduction
    pub applied: f32,
    /// The hit took the agent from alive to dead
    pub killed: bool,
    /// Set when the hit set off an exploder
    pub detonation: Option<AgentEvent>,
}

pub struct Arena {
    pub(crate) config: AiConfig,
    pub(crate) agents: Vec<Agent>,
    pub(crate) player_position: Vec3,
    pub(crate) coordinator: SquadCoordinator,
    pub(crate) oracle: Option<Box<dyn CollisionOracle>>,
    pub(crate) planner: Box<dyn PathPlanner>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) clock: SimClock,
    next_id: u32,
    seed: u64,
}

impl Arena {
    /// Build an arena; the occupancy grid is sampled once from the oracle
    pub fn new(config: AiConfig, oracle: Option<Box<dyn CollisionOracle>>, seed: u64) -> Result<Self> {
        config.validate()?;

        let grid = OccupancyGrid::build(oracle.as_deref(), &config.arena);
        let planner = planner_for(&config.pathing, grid);
        let coordinator = SquadCoordinator::new(
            config.squad.clone(),
            config.threat.clone(),
            config.awareness.received_alert_gain,
            seed ^ COORDINATOR_SEED_SALT,
        );
        let clock = SimClock::new(config.arena.tick_rate);

        tracing::info!(
            "Arena ready: half extent {}, {:?} planner, seed {}",
            config.arena.half_extent,
            planner.strategy(),
            seed
        );

        Ok(Self {
            config,
            agents: Vec::new(),
            player_position: Vec3::ZERO,
            coordinator,
            oracle,
            planner,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock,
            next_id: 0,
            seed,
        })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    pub fn oracle(&self) -> Option<&dyn CollisionOracle> {
        self.oracle.as_deref()
    }

    pub fn planner(&self) -> &dyn PathPlanner {
        self.planner.as_ref()
    }

    pub fn coordinator(&self) -> &SquadCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut SquadCoordinator {
        &mut self.coordinator
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Result<&Agent> {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .ok_or(ArenaError::AgentNotFound(id))
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent> {
        self.agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ArenaError::AgentNotFound(id))
    }

    pub fn live_agent_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Add an agent; its periodic work starts at a random phase
    pub fn spawn_agent(&mut self, archetype: Archetype, position: Vec3) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let interval = self.config.awareness.update_interval_ticks.max(1);
        let tick_phase = self.rng.gen_range(0..interval);
        let phase = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let mut agent = Agent::new(id, archetype, position, tick_phase, phase, self.config.awareness.history_len);
        if archetype.stats().flying {
            agent.position.y = self.config.tactics.drone_hover_altitude;
        }

        tracing::debug!("Spawned {} as {} at {:?}", id, archetype.name(), position);
        self.agents.push(agent);
        id
    }

    pub fn player_position(&self) -> Vec3 {
        self.player_position
    }

    pub fn set_player_position(&mut self, position: Vec3) {
        self.player_position = position;
    }

    /// Player hits an agent
    ///
    /// Applies the hit, feeds the squad threat tracker (damage, kill or
    /// headshot) and sets off an exploder taken to zero health.
    pub fn damage_agent(&mut self, id: AgentId, amount: f32, source: Vec3, headshot: bool) -> Result<DamageOutcome> {
        let now = self.clock.now();
        let tick = self.clock.current_tick();
        let awareness = &self.config.awareness;
        let tactics = &self.config.tactics;
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ArenaError::AgentNotFound(id))?;

        let was_alive = agent.is_alive();
        let applied = agent.apply_damage(amount, source, now, awareness, tactics);
        let killed = was_alive && !agent.is_alive();

        let mut detonation = None;
        if killed {
            if let ArchetypeState::Exploder { triggered } = &mut agent.archetype_state {
                if !*triggered {
                    *triggered = true;
                    tracing::debug!("{} set off by lethal damage", id);
                    detonation = Some(AgentEvent::Detonated {
                        agent: id,
                        tick,
                        position: agent.position,
                        radius: tactics.exploder_blast_radius,
                        damage: agent.stats.damage,
                    });
                }
            }
        }

        if applied > 0.0 {
            let action = if headshot {
                PlayerAction::Headshot
            } else if killed {
                PlayerAction::Kill
            } else {
                PlayerAction::Damage
            };
            self.coordinator.update_threat_level(action, now);
        }

        Ok(DamageOutcome {
            applied,
            killed,
            detonation,
        })
    }

    /// Report a player action to the squad threat tracker
    pub fn record_player_action(&mut self, action: PlayerAction) -> f32 {
        let now = self.clock.now();
        self.coordinator.update_threat_level(action, now)
    }

    /// Advance one fixed step
    pub fn tick(&mut self) -> Vec<AgentEvent> {
        run_arena_tick(self)
    }

    /// Drop agents and squad state, rewind the clock and reseed
    pub fn reset_session(&mut self) {
        self.agents.clear();
        self.coordinator.reset();
        self.clock = SimClock::new(self.config.arena.tick_rate);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.next_id = 0;
        self.player_position = Vec3::ZERO;
        tracing::info!("Arena session reset");
    }
}
