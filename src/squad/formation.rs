//! Formation groups and slot geometry

use std::f32::consts::TAU;

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::SquadConfig;
use crate::core::types::{bearing, bearing_vector, horizontal_distance, AgentId, FormationId};
use crate::tactics::state::FormationRole;

/// Shape a group takes around the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationType {
    /// Evenly spaced ring
    Surround,
    /// Two arms closing from either side
    Pincer,
    /// Mostly head-on, flankers slightly off-axis
    Line,
    /// Spread out with random jitter
    Scatter,
}

impl FormationType {
    /// Priority: high threat scatters, then by group size
    pub fn for_group(size: usize, threat: f32, scatter_threshold: f32) -> Self {
        if threat > scatter_threshold {
            FormationType::Scatter
        } else if size >= 4 {
            FormationType::Surround
        } else if size == 3 {
            FormationType::Pincer
        } else {
            FormationType::Line
        }
    }
}

/// Randomized part of a slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotRoll {
    /// Surround ring radius
    pub radius: f32,
    /// Scatter bearing offset in radians
    pub jitter: f32,
}

/// Live agents grouped for one rebalance period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationGroup {
    pub id: FormationId,
    pub formation_type: FormationType,
    pub leader: AgentId,
    /// Player position when the group formed
    pub target_position: Vec3,
    /// Leader first, then the rest in assignment order
    pub members: Vec<AgentId>,
    pub roles: AHashMap<AgentId, FormationRole>,
    /// Cached rolls when slots are stable
    pub slots: AHashMap<AgentId, SlotRoll>,
}

impl FormationGroup {
    /// Leader first; the next two are flankers, the rest support
    pub fn new(
        id: FormationId,
        formation_type: FormationType,
        leader: AgentId,
        others: &[AgentId],
        target_position: Vec3,
    ) -> Self {
        let mut members = Vec::with_capacity(others.len() + 1);
        let mut roles = AHashMap::with_capacity(others.len() + 1);
        members.push(leader);
        roles.insert(leader, FormationRole::Leader);
        for (i, &id) in others.iter().enumerate() {
            members.push(id);
            roles.insert(id, if i < 2 { FormationRole::Flanker } else { FormationRole::Support });
        }

        Self {
            id,
            formation_type,
            leader,
            target_position,
            members,
            roles,
            slots: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.roles.contains_key(&agent)
    }

    pub fn role_of(&self, agent: AgentId) -> Option<FormationRole> {
        self.roles.get(&agent).copied()
    }

    pub fn slot_index(&self, agent: AgentId) -> Option<usize> {
        self.members.iter().position(|&m| m == agent)
    }
}

/// Where a member should stand
///
/// `index`/`count` place surround slots evenly around the player. The
/// other shapes work off the agent's current bearing from the player.
/// Altitude is kept from the agent's current position.
pub fn slot_position(
    formation_type: FormationType,
    role: FormationRole,
    index: usize,
    count: usize,
    agent_position: Vec3,
    target: Vec3,
    roll: SlotRoll,
    config: &SquadConfig,
) -> Vec3 {
    let current_bearing = bearing(target, agent_position);
    let flanker = role == FormationRole::Flanker;

    let (angle, radius) = match formation_type {
        FormationType::Surround => (index as f32 * TAU / count.max(1) as f32, roll.radius),
        FormationType::Pincer => {
            let offset = config.pincer_angle_deg.to_radians();
            let angle = if flanker { current_bearing + offset } else { current_bearing - offset };
            (angle, config.pincer_radius)
        }
        FormationType::Line => {
            let offset = if flanker { config.line_flank_offset_deg.to_radians() } else { 0.0 };
            (current_bearing + offset, config.line_radius)
        }
        FormationType::Scatter => (
            current_bearing + roll.jitter,
            horizontal_distance(agent_position, target) + config.scatter_radius_gain,
        ),
    };

    let mut position = target + bearing_vector(angle) * radius;
    position.y = agent_position.y;
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLL: SlotRoll = SlotRoll {
        radius: 10.0,
        jitter: 0.0,
    };

    #[test]
    fn test_type_priority() {
        assert_eq!(FormationType::for_group(5, 80.0, 70.0), FormationType::Scatter);
        assert_eq!(FormationType::for_group(4, 10.0, 70.0), FormationType::Surround);
        assert_eq!(FormationType::for_group(3, 10.0, 70.0), FormationType::Pincer);
        assert_eq!(FormationType::for_group(2, 10.0, 70.0), FormationType::Line);
        // Exactly at the threshold does not scatter
        assert_eq!(FormationType::for_group(2, 70.0, 70.0), FormationType::Line);
    }

    #[test]
    fn test_roles_by_order() {
        let others = [AgentId(2), AgentId(3), AgentId(4), AgentId(5)];
        let group = FormationGroup::new(FormationId(0), FormationType::Surround, AgentId(1), &others, Vec3::ZERO);
        assert_eq!(group.role_of(AgentId(1)), Some(FormationRole::Leader));
        assert_eq!(group.role_of(AgentId(2)), Some(FormationRole::Flanker));
        assert_eq!(group.role_of(AgentId(3)), Some(FormationRole::Flanker));
        assert_eq!(group.role_of(AgentId(4)), Some(FormationRole::Support));
        assert_eq!(group.role_of(AgentId(5)), Some(FormationRole::Support));
        assert_eq!(group.slot_index(AgentId(4)), Some(3));
        assert_eq!(group.len(), 5);
    }

    #[test]
    fn test_surround_slots_evenly_spaced() {
        let config = SquadConfig::default();
        let target = Vec3::new(3.0, 0.0, -2.0);
        let positions: Vec<Vec3> = (0..5)
            .map(|i| {
                slot_position(FormationType::Surround, FormationRole::Support, i, 5, Vec3::ZERO, target, ROLL, &config)
            })
            .collect();
        for (i, p) in positions.iter().enumerate() {
            assert!((horizontal_distance(*p, target) - 10.0).abs() < 1e-4);
            let expected = i as f32 * 72.0_f32.to_radians();
            let actual = bearing(target, *p).rem_euclid(TAU);
            assert!((actual - expected).abs() < 1e-3, "slot {i}: {actual} vs {expected}");
        }
    }

    #[test]
    fn test_pincer_arms_mirror() {
        let config = SquadConfig::default();
        let agent = Vec3::new(10.0, 0.0, 0.0);
        let flank = slot_position(FormationType::Pincer, FormationRole::Flanker, 1, 3, agent, Vec3::ZERO, ROLL, &config);
        let other = slot_position(FormationType::Pincer, FormationRole::Leader, 0, 3, agent, Vec3::ZERO, ROLL, &config);
        assert!((bearing(Vec3::ZERO, flank) - 60.0_f32.to_radians()).abs() < 1e-4);
        assert!((bearing(Vec3::ZERO, other) + 60.0_f32.to_radians()).abs() < 1e-4);
        assert!((flank.length() - config.pincer_radius).abs() < 1e-4);
    }

    #[test]
    fn test_line_support_head_on() {
        let config = SquadConfig::default();
        let agent = Vec3::new(0.0, 0.0, 25.0);
        let p = slot_position(FormationType::Line, FormationRole::Support, 3, 4, agent, Vec3::ZERO, ROLL, &config);
        assert!((p - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_scatter_pushes_outward() {
        let config = SquadConfig::default();
        let agent = Vec3::new(5.0, 2.0, 0.0);
        let roll = SlotRoll {
            radius: 10.0,
            jitter: 0.3,
        };
        let p = slot_position(FormationType::Scatter, FormationRole::Support, 0, 2, agent, Vec3::ZERO, roll, &config);
        assert!((horizontal_distance(p, Vec3::ZERO) - 11.0).abs() < 1e-4);
        assert!((bearing(Vec3::ZERO, p) - 0.3).abs() < 1e-4);
        assert_eq!(p.y, 2.0);
    }
}
