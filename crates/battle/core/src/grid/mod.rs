//! Positional grid: two sides with a front and a back row each.
mod allocator;
mod highlight;
mod occupancy;
mod slot;

pub use allocator::{GridAllocator, GridError};
pub use highlight::Highlight;
pub use slot::{GridSide, Row, SlotId};
