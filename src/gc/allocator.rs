//! Arena allocator for the VM heap
//!
//! Memory layout:
//! ```text
//! arena:  [ Occupied | Free | Occupied | Occupied | Free | ... ]
//!                       ^                            |
//!           free_head --+----------------------------+  (free list)
//!
//! head -> obj -> obj -> obj -> None                      (intrusive list)
//! ```
//!
//! The arena is a growable table of slots and the sole owner of object
//! storage. An [`ObjectRef`] handed out to callers is an index into it.
//! Every live object is additionally threaded onto an intrusive list
//! through its `next` field; the sweep phase walks that list and
//! returns reclaimed slots to the free list for reuse, so object
//! storage is never moved.

use crate::value::{Object, ObjectDisplay, ObjectRef, Payload};

/// Collection threshold for a fresh heap
pub const INITIAL_GC_THRESHOLD: usize = 4;

/// One arena slot: a live object, or a link in the free list
#[derive(Debug)]
pub(crate) enum Slot {
    Occupied(Object),
    Free { next_free: Option<usize> },
}

/// The VM heap
///
/// Owns every allocated object and decides when allocation triggers a
/// collection. The root set lives outside the heap (on the operand
/// stack) and is passed in for each collection.
pub struct Heap {
    /// Arena of object slots
    slots: Vec<Slot>,

    /// Head of the free-slot list
    free_head: Option<usize>,

    /// Head of the intrusive list of all allocated objects
    pub(crate) head: Option<ObjectRef>,

    /// Number of live objects (occupied slots)
    live_count: usize,

    /// Live-object count at which the next allocation collects first
    gc_threshold: usize,

    /// Threshold to reset to when a collection empties the heap
    initial_threshold: usize,

    /// Root-set capacity; upper bound for the adaptive threshold
    root_capacity: usize,
}

impl Heap {
    /// Create a new heap
    ///
    /// # Arguments
    /// * `root_capacity` - capacity of the root set this heap serves;
    ///   the adaptive threshold is clamped to it
    /// * `initial_threshold` - live-object count that triggers the
    ///   first collection
    ///
    /// # Panics
    /// Panics if either argument is zero or the threshold exceeds the
    /// root capacity.
    pub fn new(root_capacity: usize, initial_threshold: usize) -> Self {
        assert!(root_capacity > 0, "root capacity must be nonzero");
        assert!(
            initial_threshold > 0 && initial_threshold <= root_capacity,
            "initial threshold must be in 1..={}",
            root_capacity
        );

        Heap {
            slots: Vec::new(),
            free_head: None,
            head: None,
            live_count: 0,
            gc_threshold: initial_threshold,
            initial_threshold,
            root_capacity,
        }
    }

    /// Whether the next allocation should collect first
    #[inline]
    pub(crate) fn needs_collect(&self) -> bool {
        self.live_count >= self.gc_threshold
    }

    /// Allocate an object and link it at the head of the intrusive list
    ///
    /// Takes a slot from the free list when one is available, otherwise
    /// grows the arena. Allocation itself never collects; the caller
    /// checks `needs_collect` and runs the collection first, while it
    /// still knows the root set.
    pub(crate) fn alloc(&mut self, payload: Payload) -> ObjectRef {
        let object = Object {
            marked: false,
            next: self.head,
            payload,
        };

        let index = match self.free_head {
            Some(index) => {
                self.free_head = match self.slots[index] {
                    Slot::Free { next_free } => next_free,
                    Slot::Occupied(_) => panic!("corrupt free list: slot {} is occupied", index),
                };
                self.slots[index] = Slot::Occupied(object);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(object));
                self.slots.len() - 1
            }
        };

        let obj = ObjectRef::new(index);
        self.head = Some(obj);
        self.live_count += 1;
        obj
    }

    /// Return an object's slot to the free list
    ///
    /// Only the sweep phase calls this; the object must already be
    /// unlinked from the intrusive list.
    pub(crate) fn free(&mut self, obj: ObjectRef) {
        let index = obj.index();
        debug_assert!(matches!(self.slots[index], Slot::Occupied(_)));
        self.slots[index] = Slot::Free {
            next_free: self.free_head,
        };
        self.free_head = Some(index);
        self.live_count -= 1;
    }

    /// Get a shared reference to an object
    ///
    /// # Panics
    /// Panics if the slot was reclaimed; only stale [`ObjectRef`]s name
    /// reclaimed slots.
    #[inline]
    pub(crate) fn get(&self, obj: ObjectRef) -> &Object {
        match &self.slots[obj.index()] {
            Slot::Occupied(object) => object,
            Slot::Free { .. } => panic!("use of reclaimed object slot {}", obj.index()),
        }
    }

    /// Get an exclusive reference to an object
    #[inline]
    pub(crate) fn get_mut(&mut self, obj: ObjectRef) -> &mut Object {
        match &mut self.slots[obj.index()] {
            Slot::Occupied(object) => object,
            Slot::Free { .. } => panic!("use of reclaimed object slot {}", obj.index()),
        }
    }

    /// Number of live objects
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Current collection threshold
    #[inline]
    pub fn threshold(&self) -> usize {
        self.gc_threshold
    }

    /// Recompute the threshold after a collection
    ///
    /// An empty heap resets to the initial threshold; otherwise the
    /// threshold tracks twice the surviving live count, clamped to the
    /// root-set capacity so collection keeps firing under sustained
    /// allocation.
    pub(crate) fn update_threshold(&mut self) {
        self.gc_threshold = if self.live_count == 0 {
            self.initial_threshold
        } else {
            (self.live_count * 2).min(self.root_capacity)
        };
    }

    /// Displayable rendering of the object graph rooted at `obj`
    pub fn display(&self, obj: ObjectRef) -> ObjectDisplay<'_> {
        ObjectDisplay::new(self, obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_creation() {
        let heap = Heap::new(120, INITIAL_GC_THRESHOLD);
        assert_eq!(heap.live_count(), 0);
        assert_eq!(heap.threshold(), INITIAL_GC_THRESHOLD);
        assert!(heap.head.is_none());
    }

    #[test]
    #[should_panic(expected = "initial threshold")]
    fn test_threshold_above_capacity_rejected() {
        Heap::new(8, 9);
    }

    #[test]
    fn test_alloc_links_at_head() {
        let mut heap = Heap::new(120, 4);

        let a = heap.alloc(Payload::Scalar(1));
        let b = heap.alloc(Payload::Scalar(2));

        assert_eq!(heap.live_count(), 2);
        assert_eq!(heap.head, Some(b));
        assert_eq!(heap.get(b).next, Some(a));
        assert_eq!(heap.get(a).next, None);
        assert!(!heap.get(a).marked);
    }

    #[test]
    fn test_free_slot_reuse() {
        let mut heap = Heap::new(120, 4);

        let a = heap.alloc(Payload::Scalar(1));
        let b = heap.alloc(Payload::Scalar(2));
        assert_eq!(heap.slots.len(), 2);

        // Unlink b by hand and free it; the next allocation must reuse
        // its slot instead of growing the arena.
        heap.head = Some(a);
        heap.free(b);
        assert_eq!(heap.live_count(), 1);

        let c = heap.alloc(Payload::Scalar(3));
        assert_eq!(c.index(), b.index());
        assert_eq!(heap.slots.len(), 2);
        assert_eq!(heap.live_count(), 2);
    }

    #[test]
    fn test_needs_collect_at_threshold() {
        let mut heap = Heap::new(120, 2);

        assert!(!heap.needs_collect());
        heap.alloc(Payload::Scalar(1));
        assert!(!heap.needs_collect());
        heap.alloc(Payload::Scalar(2));
        assert!(heap.needs_collect());
    }

    #[test]
    fn test_threshold_update_rules() {
        let mut heap = Heap::new(10, 4);

        // Nonzero survivors: threshold doubles the live count.
        heap.alloc(Payload::Scalar(1));
        heap.alloc(Payload::Scalar(2));
        heap.alloc(Payload::Scalar(3));
        heap.update_threshold();
        assert_eq!(heap.threshold(), 6);

        // Clamped to the root capacity.
        heap.alloc(Payload::Scalar(4));
        heap.alloc(Payload::Scalar(5));
        heap.alloc(Payload::Scalar(6));
        heap.update_threshold();
        assert_eq!(heap.threshold(), 10);

        // Empty heap resets to the initial threshold.
        let live: Vec<ObjectRef> = {
            let mut refs = Vec::new();
            let mut cursor = heap.head;
            while let Some(obj) = cursor {
                refs.push(obj);
                cursor = heap.get(obj).next;
            }
            refs
        };
        heap.head = None;
        for obj in live {
            heap.free(obj);
        }
        heap.update_threshold();
        assert_eq!(heap.threshold(), 4);
    }
}
