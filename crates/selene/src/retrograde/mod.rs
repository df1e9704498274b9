pub mod alerts;
pub mod extractor;
pub mod guides;

pub use alerts::RetroAlertFormatter;
pub use extractor::{extract_periods, next_period, ExtractionWindow, RetroPeriod, RetrogradeTracker};
pub use guides::{GuidePhase, PlanetGuide, RetroMessages, RetrogradeGuides};
