#[cfg(feature = "swisseph")]
pub mod adapter;
pub mod types;

#[cfg(feature = "swisseph")]
pub use adapter::SwissEphemerisAdapter;
pub use types::{
    CuspId, EphemerisError, EphemerisProvider, GeoLocation, HouseSystem, Planet, PlanetPosition,
    RawCusp,
};
