pub mod discovery;
pub mod section;

pub use discovery::discover_sections;
pub use section::{AnimatableItem, ItemState, Section};
