//! Catalog domain module.
//!
//! Categories, items with their available quantity and lifecycle status, and
//! per-item pack definitions. Pure data + input validation (no IO, no storage).

pub mod category;
pub mod item;
pub mod pack_size;

pub use category::Category;
pub use item::{Item, ItemListing, ItemStatus, ItemUpdate, NewItem};
pub use pack_size::PackSize;
