//! Agent tactics: awareness, archetype policies, cover and evasion

pub mod archetype;
pub mod awareness;
pub mod cover;
pub mod intent;
pub mod maneuver;
pub mod policy;
pub mod state;

pub use archetype::{Archetype, ArchetypeState, ArchetypeStats};
pub use awareness::{has_line_of_sight, update_awareness, AwarenessOutcome, TargetTracker};
pub use cover::{find_cover, CoverProbe};
pub use intent::{select_intent, Intent, TacticalInputs};
pub use maneuver::{evasion_heading, resolve_step, BodyShape};
pub use policy::{move_order, MoveContext, MoveOrder};
pub use state::{AgentAIState, FormationRole};
