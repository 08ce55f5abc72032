//! The collection store: artworks, lists, and the links between them.

mod collections;
mod events;
mod hydrate;
mod store;

pub use events::{ChangeEvent, ChangeKind, CHANGE_EVENT};
pub use hydrate::{HydrationReport, LoadOutcome};
pub use store::{CollectionStore, StoreState};
