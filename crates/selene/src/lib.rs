pub mod aspect_of_day;
pub mod aspects;
pub mod chart;
pub(crate) mod data;
pub mod engine;
pub mod ephemeris;
pub mod error;
pub mod forecast;
pub mod interpretation;
pub mod lunar;
pub mod retrograde;
pub mod settings;
pub mod timezone;
pub mod zodiac;

pub use aspect_of_day::{format_day_aspects, AspectOfDayService, DayAspect};
pub use aspects::{AspectCalculator, AspectKind, AspectTable, TransitAspect};
pub use chart::{locate_house, ChartBuilder, ChartKind, ChartSnapshot, HouseCusp};
pub use engine::{Engine, ReferenceData};
pub use ephemeris::{EphemerisError, EphemerisProvider, GeoLocation, HouseSystem, Planet, PlanetPosition};
pub use error::EngineError;
pub use forecast::{BirthProfile, BirthProfileStore, ForecastResult};
pub use lunar::{ActionSuggestion, DayContext, MoonPhase};
pub use retrograde::{extract_periods, RetroPeriod};
pub use settings::EngineSettings;
