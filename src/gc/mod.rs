//! Garbage collector module
//!
//! The heap uses a tracing mark-and-sweep garbage collector over an
//! arena of object slots.
//!
//! Properties of this design:
//! - The mark flag is the visited set, so cycles are handled for free
//! - Reclaimed slots go onto a free list; objects never move
//! - An adaptive threshold keeps collection frequency proportional to
//!   heap occupancy

mod allocator;
mod collector;

pub use allocator::{Heap, INITIAL_GC_THRESHOLD};
pub use collector::GcStats;

use crate::value::ObjectRef;

impl Heap {
    /// Run garbage collection with the given root set
    pub fn collect(&mut self, roots: &[ObjectRef]) -> GcStats {
        collector::collect(self, roots)
    }
}
