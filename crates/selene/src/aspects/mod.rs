pub mod calculator;
pub mod types;

pub use calculator::{
    angular_distance, aspect_weight, is_applying, sort_by_strength, AspectCalculator, EXACT_ORB,
};
pub use types::{AspectKind, AspectTable, TransitAspect};
