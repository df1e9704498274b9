pub mod labels;
pub mod renderer;
pub mod templates;

pub use renderer::{RenderedAspect, TransitInterpreter, NO_TRANSITS_TEXT};
pub use templates::{fill_placeholders, TemplateVariant, TransitTemplates};
