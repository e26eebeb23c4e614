pub mod commands;
pub mod events;
pub mod input;
pub mod page;
pub mod types;

pub use commands::FlowCommand;
pub use events::{EventKind, FlowEvent};
pub use input::{IntersectionEntry, NavKey};
pub use page::{Environment, PageNode, PageSnapshot};
pub use types::{Extent, ScrollDirection};
