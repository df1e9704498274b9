pub mod builder;
pub mod houses;
pub mod types;

pub use builder::{ChartBuilder, REFERENCE_HOUR};
pub use houses::{locate_house, normalize_cusps, normalize_house_id};
pub use types::{ChartKind, ChartSnapshot, HouseCusp};
