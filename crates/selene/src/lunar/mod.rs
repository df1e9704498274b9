pub mod catalog;
pub mod planner;

pub use catalog::{
    ActionDefinition, LunarCatalog, MoonPhase, PhaseAdvice, PhaseDefinition, Rating, SignDefinition,
};
pub use planner::{illumination, phase_key_from_angle, ActionSuggestion, DayContext, LunarPlanner};
