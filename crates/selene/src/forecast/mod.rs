pub mod orchestrator;
pub mod profile;

pub use orchestrator::{DailyForecaster, ForecastResult};
pub use profile::{
    parse_birth_datetime, parse_time_of_day, validate_birth_date, validate_birth_time,
    validate_coordinate, validate_timezone, BirthProfile, BirthProfileStore,
};
