//! MiniVM - a minimal stack-based virtual machine heap
//!
//! The interesting part is the memory manager: the VM allocates two
//! kinds of heap values (scalars and pairs) and reclaims unreachable
//! ones with a stop-the-world tracing mark-and-sweep collector.
//!
//! # Features
//! - Arena-backed object storage; references are indices, so cyclic
//!   graphs need no ownership tricks
//! - Work-list marking that is safe on arbitrarily deep or cyclic
//!   graphs
//! - Sweeping over an intrusive all-objects list with free-slot reuse
//! - Adaptive collection threshold that tracks the live-set size
//!
//! # Example
//! ```
//! use minivm::Vm;
//!
//! let mut vm = Vm::new();
//! vm.new_scalar(1).unwrap();
//! vm.new_scalar(2).unwrap();
//! vm.new_pair().unwrap();
//!
//! let stats = vm.collect();
//! assert_eq!(stats.remaining, 3); // the pair and both scalars
//! assert_eq!(stats.collected, 0);
//! ```

// Core modules
pub mod value;

// Garbage collector
pub mod gc;

// Virtual machine
pub mod vm;

// Re-export main types
pub use gc::GcStats;
pub use value::{ObjectKind, ObjectRef};
pub use vm::{Vm, VmError, VmResult};
