//! Mark-and-sweep garbage collector
//!
//! The GC works in two phases:
//! 1. Mark: traverse all reachable objects starting from the roots,
//!    set the mark flag
//! 2. Sweep: walk the intrusive list of all allocated objects, free
//!    the unmarked ones, clear the flag on survivors
//!
//! The mark flag doubles as the visited set: marking returns early on
//! an already-marked object, so cyclic graphs - self-reference
//! included - terminate after visiting each edge at most once. Marking
//! uses an explicit work-list instead of recursion, so the call stack
//! stays flat no matter how deeply pairs are nested.

use super::allocator::Heap;
use crate::value::{ObjectRef, Payload};

/// Statistics about a GC run
#[derive(Debug, Clone, Copy, Default)]
pub struct GcStats {
    /// Number of objects reclaimed by the sweep
    pub collected: usize,
    /// Number of objects surviving the collection
    pub remaining: usize,
}

/// Run a full mark-and-sweep collection
///
/// Every reference in `roots` is treated as unconditionally reachable.
/// After the sweep the adaptive threshold is recomputed from the
/// surviving live count.
pub fn collect(heap: &mut Heap, roots: &[ObjectRef]) -> GcStats {
    let before = heap.live_count();

    mark_from_roots(heap, roots);
    sweep(heap);
    heap.update_threshold();

    let remaining = heap.live_count();
    let stats = GcStats {
        collected: before - remaining,
        remaining,
    };

    #[cfg(feature = "dump")]
    eprintln!(
        "[gc] collected {} of {}, {} remaining, next threshold {}",
        stats.collected,
        before,
        stats.remaining,
        heap.threshold()
    );

    stats
}

/// Mark every object reachable from the roots
fn mark_from_roots(heap: &mut Heap, roots: &[ObjectRef]) {
    let mut pending: Vec<ObjectRef> = roots.to_vec();

    while let Some(obj) = pending.pop() {
        let object = heap.get_mut(obj);
        if object.marked {
            // Already visited; this is what terminates cycles.
            continue;
        }
        object.marked = true;

        if let Payload::Pair { first, second } = object.payload {
            // second below first, so first is traversed first
            pending.push(second);
            pending.push(first);
        }
    }
}

/// The link slot a sweep cursor points through
///
/// Models the "pointer to the slot referencing the current node": either
/// the heap's list head or the `next` field of the previous survivor.
/// Unlinking writes through the slot, so no separate predecessor
/// bookkeeping is needed.
#[derive(Clone, Copy)]
enum Cursor {
    Head,
    After(ObjectRef),
}

impl Cursor {
    /// Read the reference stored in the slot
    fn target(self, heap: &Heap) -> Option<ObjectRef> {
        match self {
            Cursor::Head => heap.head,
            Cursor::After(obj) => heap.get(obj).next,
        }
    }

    /// Overwrite the reference stored in the slot
    fn set_target(self, heap: &mut Heap, to: Option<ObjectRef>) {
        match self {
            Cursor::Head => heap.head = to,
            Cursor::After(obj) => heap.get_mut(obj).next = to,
        }
    }
}

/// Free every unmarked object and clear the flag on the rest
fn sweep(heap: &mut Heap) {
    let mut cursor = Cursor::Head;

    while let Some(current) = cursor.target(heap) {
        if heap.get(current).marked {
            // Survivor: unmark it for the next cycle and step past it.
            heap.get_mut(current).marked = false;
            cursor = Cursor::After(current);
        } else {
            // Unreached: unlink it and release its slot. The cursor
            // stays put; it now points at the successor.
            let next = heap.get(current).next;
            cursor.set_target(heap, next);
            heap.free(current);
        }
    }
}
