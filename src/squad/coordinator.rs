//! Squad coordinator: alert propagation, threat and formations
//!
//! One coordinator per arena session, owned by the arena and handed to
//! agents by reference. Nothing about it is global.

use std::cmp::Reverse;

use ahash::AHashMap;
use glam::Vec3;
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::{SquadConfig, ThreatConfig};
use crate::core::types::{horizontal_distance, AgentId, FormationId, SimTime};
use crate::squad::cluster::cluster_agents;
use crate::squad::formation::{slot_position, FormationGroup, FormationType, SlotRoll};
use crate::squad::threat::{PlayerAction, ThreatTracker};
use crate::tactics::state::{AgentAIState, FormationRole};

/// What the coordinator needs to see of an agent
pub trait SquadMember {
    fn id(&self) -> AgentId;
    fn position(&self) -> Vec3;
    fn is_alive(&self) -> bool;
    fn ai_state(&self) -> &AgentAIState;
    fn ai_state_mut(&mut self) -> &mut AgentAIState;
}

pub struct SquadCoordinator {
    config: SquadConfig,
    threat_config: ThreatConfig,
    /// Alert added to agents reached by a broadcast
    alert_gain: f32,
    threat: ThreatTracker,
    formations: Vec<FormationGroup>,
    /// Agent -> index into `formations`
    membership: AHashMap<AgentId, usize>,
    last_rebalance: Option<SimTime>,
    next_formation_id: u32,
    rng: ChaCha8Rng,
}

impl SquadCoordinator {
    pub fn new(config: SquadConfig, threat_config: ThreatConfig, alert_gain: f32, seed: u64) -> Self {
        Self {
            config,
            threat_config,
            alert_gain,
            threat: ThreatTracker::new(),
            formations: Vec::new(),
            membership: AHashMap::new(),
            last_rebalance: None,
            next_formation_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SquadConfig {
        &self.config
    }

    pub fn threat_level(&self) -> f32 {
        self.threat.level()
    }

    pub fn formations(&self) -> &[FormationGroup] {
        &self.formations
    }

    pub fn formation_of(&self, agent: AgentId) -> Option<&FormationGroup> {
        self.membership.get(&agent).and_then(|&i| self.formations.get(i))
    }

    /// Alert every other live agent within `alert_radius` of the source
    ///
    /// Returns the agents that were alerted.
    pub fn alert_nearby_agents<M: SquadMember>(
        &self,
        source: AgentId,
        source_position: Vec3,
        player_position: Vec3,
        agents: &mut [M],
        now: SimTime,
    ) -> Vec<AgentId> {
        let mut alerted = Vec::new();
        for agent in agents.iter_mut() {
            if agent.id() == source || !agent.is_alive() {
                continue;
            }
            if horizontal_distance(agent.position(), source_position) > self.config.alert_radius {
                continue;
            }
            agent
                .ai_state_mut()
                .receive_alert(source, player_position, self.alert_gain, now);
            alerted.push(agent.id());
        }

        if !alerted.is_empty() {
            tracing::debug!("{} alerted {} nearby agents", source, alerted.len());
        }
        alerted
    }

    /// Raise threat for a player action; schedules its own decay
    pub fn update_threat_level(&mut self, action: PlayerAction, now: SimTime) -> f32 {
        let level = self.threat.record(action, now, &self.threat_config);
        tracing::debug!("Threat {:?} -> {:.1}", action, level);
        level
    }

    /// Apply threat decays that have come due
    pub fn update(&mut self, now: SimTime) {
        self.threat.advance(now, &self.threat_config);
    }

    /// Regroup live agents into formations around `target_position`
    ///
    /// Rate-limited to one run per `rebalance_interval`; returns whether it
    /// ran. Roles are written back into each agent's AI state.
    pub fn rebalance_formations<M: SquadMember>(
        &mut self,
        agents: &mut [M],
        target_position: Vec3,
        now: SimTime,
    ) -> bool {
        if let Some(last) = self.last_rebalance {
            if now - last < self.config.rebalance_interval {
                return false;
            }
        }
        self.last_rebalance = Some(now);

        let live: Vec<(AgentId, Vec3)> = agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| (a.id(), a.position()))
            .collect();
        let alert_of: AHashMap<AgentId, f32> = agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| (a.id(), a.ai_state().alert_level()))
            .collect();

        self.formations.clear();
        self.membership.clear();

        let threat = self.threat.level();
        for cluster in cluster_agents(&live, self.config.cluster_distance, self.config.clustering) {
            if cluster.len() < 2 {
                continue;
            }

            // Highest alert leads; ties go to the lowest id
            let Some(&leader) = cluster
                .iter()
                .max_by_key(|id| (OrderedFloat(alert_of.get(*id).copied().unwrap_or(0.0)), Reverse(**id)))
            else {
                continue;
            };
            let others: Vec<AgentId> = cluster.iter().copied().filter(|&id| id != leader).collect();

            let formation_type = FormationType::for_group(cluster.len(), threat, self.threat_config.scatter_threshold);
            let id = FormationId(self.next_formation_id);
            self.next_formation_id = self.next_formation_id.wrapping_add(1);

            let index = self.formations.len();
            for &member in &cluster {
                self.membership.insert(member, index);
            }
            self.formations.push(FormationGroup::new(id, formation_type, leader, &others, target_position));
        }

        for agent in agents.iter_mut() {
            let role = if !agent.is_alive() {
                FormationRole::None
            } else {
                self.formation_of(agent.id())
                    .and_then(|group| group.role_of(agent.id()))
                    .unwrap_or(FormationRole::Lone)
            };
            agent.ai_state_mut().formation_role = role;
        }

        tracing::debug!(
            "Rebalanced {} live agents into {} formations (threat {:.1})",
            live.len(),
            self.formations.len(),
            threat
        );
        true
    }

    /// Slot for an agent around `target`, or `None` outside any formation
    pub fn get_formation_position(&mut self, agent: AgentId, agent_position: Vec3, target: Vec3) -> Option<Vec3> {
        let &group_index = self.membership.get(&agent)?;
        let stable = self.config.stable_slots;

        let (formation_type, role, index, count, cached) = {
            let group = self.formations.get(group_index)?;
            (
                group.formation_type,
                group.role_of(agent)?,
                group.slot_index(agent)?,
                group.len(),
                group.slots.get(&agent).copied(),
            )
        };

        let roll = match cached.filter(|_| stable) {
            Some(roll) => roll,
            None => {
                let roll = self.roll_slot();
                if stable {
                    if let Some(group) = self.formations.get_mut(group_index) {
                        group.slots.insert(agent, roll);
                    }
                }
                roll
            }
        };

        Some(slot_position(
            formation_type,
            role,
            index,
            count,
            agent_position,
            target,
            roll,
            &self.config,
        ))
    }

    fn roll_slot(&mut self) -> SlotRoll {
        let jitter = self.config.scatter_jitter_deg.to_radians();
        let radius = if self.config.surround_radius_max > self.config.surround_radius_min {
            self.rng
                .gen_range(self.config.surround_radius_min..=self.config.surround_radius_max)
        } else {
            self.config.surround_radius_min
        };
        let jitter = if jitter > 0.0 {
            self.rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        };
        SlotRoll { radius, jitter }
    }

    /// Drop all formations, threat and rate-limit state
    pub fn reset(&mut self) {
        self.threat.reset();
        self.formations.clear();
        self.membership.clear();
        self.last_rebalance = None;
        self.next_formation_id = 0;
        tracing::info!("Squad coordinator reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Vec3 = Vec3::new(0.0, 0.0, 20.0);

    struct Member {
        id: AgentId,
        position: Vec3,
        alive: bool,
        ai: AgentAIState,
    }

    impl SquadMember for Member {
        fn id(&self) -> AgentId {
            self.id
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn is_alive(&self) -> bool {
            self.alive
        }
        fn ai_state(&self) -> &AgentAIState {
            &self.ai
        }
        fn ai_state_mut(&mut self) -> &mut AgentAIState {
            &mut self.ai
        }
    }

    fn member(id: u32, x: f32, z: f32) -> Member {
        Member {
            id: AgentId(id),
            position: Vec3::new(x, 0.0, z),
            alive: true,
            ai: AgentAIState::new(),
        }
    }

    fn coordinator() -> SquadCoordinator {
        SquadCoordinator::new(SquadConfig::default(), ThreatConfig::default(), 25.0, 7)
    }

    #[test]
    fn test_alert_reaches_only_nearby_live_agents() {
        let coordinator = coordinator();
        let mut agents = vec![member(0, 0.0, 0.0), member(1, 10.0, 0.0), member(2, 40.0, 0.0), member(3, 5.0, 5.0)];
        agents[3].alive = false;
        let player = Vec3::new(0.0, 0.0, 20.0);

        let alerted = coordinator.alert_nearby_agents(AgentId(0), Vec3::ZERO, player, &mut agents, 1.0);
        assert_eq!(alerted, vec![AgentId(1)]);
        assert_eq!(agents[1].ai.alert_level(), 25.0);
        assert_eq!(agents[1].ai.alerted_by, Some(AgentId(0)));
        assert_eq!(agents[1].ai.last_known_player_position, Some(player));
        assert_eq!(agents[0].ai.alert_level(), 0.0);
        assert_eq!(agents[2].ai.alert_level(), 0.0);
        assert_eq!(agents[3].ai.alert_level(), 0.0);
    }

    #[test]
    fn test_rebalance_rate_limited() {
        let mut coordinator = coordinator();
        let mut agents = vec![member(0, 0.0, 0.0), member(1, 3.0, 0.0)];
        assert!(coordinator.rebalance_formations(&mut agents, TARGET, 0.0));
        assert!(!coordinator.rebalance_formations(&mut agents, TARGET, 1.5));
        assert!(coordinator.rebalance_formations(&mut agents, TARGET, 2.0));
    }

    #[test]
    fn test_rebalance_assigns_roles() {
        let mut coordinator = coordinator();
        let mut agents: Vec<Member> = (0..5).map(|i| member(i, i as f32, 0.0)).collect();
        agents[3].ai.set_alert_level(80.0);
        agents.push(member(9, 45.0, 45.0));

        coordinator.rebalance_formations(&mut agents, TARGET, 0.0);

        assert_eq!(coordinator.formations().len(), 1);
        let group = &coordinator.formations()[0];
        assert_eq!(group.leader, AgentId(3));
        assert_eq!(group.formation_type, FormationType::Surround);
        assert_eq!(group.target_position, TARGET);
        assert_eq!(agents[3].ai.formation_role, FormationRole::Leader);
        assert_eq!(agents[0].ai.formation_role, FormationRole::Flanker);
        assert_eq!(agents[1].ai.formation_role, FormationRole::Flanker);
        assert_eq!(agents[2].ai.formation_role, FormationRole::Support);
        assert_eq!(agents[4].ai.formation_role, FormationRole::Support);
        assert_eq!(agents[5].ai.formation_role, FormationRole::Lone);
    }

    #[test]
    fn test_formation_type_follows_size_and_threat() {
        let mut coordinator = coordinator();
        let mut trio: Vec<Member> = (0..3).map(|i| member(i, i as f32, 0.0)).collect();
        coordinator.rebalance_formations(&mut trio, TARGET, 0.0);
        assert_eq!(coordinator.formations()[0].formation_type, FormationType::Pincer);

        for _ in 0..5 {
            coordinator.update_threat_level(PlayerAction::Kill, 1.0);
        }
        coordinator.rebalance_formations(&mut trio, TARGET, 2.0);
        assert_eq!(coordinator.formations()[0].formation_type, FormationType::Scatter);
    }

    #[test]
    fn test_no_formation_for_singletons() {
        let mut coordinator = coordinator();
        let mut agents = vec![member(0, -40.0, 0.0), member(1, 40.0, 0.0)];
        coordinator.rebalance_formations(&mut agents, TARGET, 0.0);
        assert!(coordinator.formations().is_empty());
        assert!(coordinator.get_formation_position(AgentId(0), agents[0].position, Vec3::ZERO).is_none());
        assert_eq!(agents[0].ai.formation_role, FormationRole::Lone);
    }

    #[test]
    fn test_membership_disjoint() {
        let mut coordinator = coordinator();
        let mut agents: Vec<Member> = (0..12)
            .map(|i| member(i, (i % 4) as f32 * 9.0, (i / 4) as f32 * 9.0))
            .collect();
        coordinator.rebalance_formations(&mut agents, TARGET, 0.0);

        let mut seen = std::collections::HashSet::new();
        for group in coordinator.formations() {
            assert!(group.len() >= 2);
            for member in &group.members {
                assert!(seen.insert(*member), "{member} in two formations");
            }
        }
    }

    #[test]
    fn test_stable_slots_repeat() {
        let mut coordinator = coordinator();
        let mut agents: Vec<Member> = (0..4).map(|i| member(i, i as f32, 0.0)).collect();
        coordinator.rebalance_formations(&mut agents, TARGET, 0.0);

        let target = Vec3::new(0.0, 0.0, 20.0);
        let first = coordinator.get_formation_position(AgentId(2), agents[2].position, target);
        let second = coordinator.get_formation_position(AgentId(2), agents[2].position, target);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut coordinator = coordinator();
        let mut agents: Vec<Member> = (0..3).map(|i| member(i, i as f32, 0.0)).collect();
        coordinator.update_threat_level(PlayerAction::Headshot, 0.0);
        coordinator.rebalance_formations(&mut agents, TARGET, 0.0);

        coordinator.reset();
        assert_eq!(coordinator.threat_level(), 0.0);
        assert!(coordinator.formations().is_empty());
        // Rate limit forgotten too
        assert!(coordinator.rebalance_formations(&mut agents, TARGET, 0.5));
    }

    #[test]
    fn test_threat_decays_through_update() {
        let mut coordinator = coordinator();
        coordinator.update_threat_level(PlayerAction::Kill, 0.0);
        coordinator.update(4.0);
        assert_eq!(coordinator.threat_level(), 15.0);
        coordinator.update(5.0);
        assert_eq!(coordinator.threat_level(), 10.0);
    }
}
