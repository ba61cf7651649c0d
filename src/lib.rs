//! Allocation primitives for caller-supplied memory
//!
//! This crate provides the core of a region-backed allocator: it carves
//! correctly-aligned allocations out of a contiguous memory buffer and keeps
//! freed regions in a singly-linked free list, so that they can be reused by
//! later allocations. It does not acquire memory on its own, it is not
//! thread-safe and it does not implement [`core::alloc::GlobalAlloc`]: those
//! are the job of a higher-level allocator built on top of these primitives.
//!
//! There are two building blocks:
//! - [`alloc_from_buf()`] carves an allocation out of a raw span of memory
//!   (start address and capacity) and reports the remaining capacity.
//! - [`Buffer::alloc_from_list_node()`] satisfies an allocation from the first
//!   node of a [`FreeList`], either retiring the node or shrinking it.
//!
//! # Usage
//! ```
//! use carvalloc::{alloc_from_buf, Buffer, FreeList};
//!
//! let mut memory = [0u8; 256];
//! let mut buffer = Buffer::new(&mut memory);
//! let mut list = FreeList::new();
//!
//! // carve straight from the untouched buffer
//! let (start, mut capacity) = buffer.fresh_span();
//! let span = alloc_from_buf(start, 32, 8, &mut capacity)?;
//! assert_eq!(span.pos % 8, 0);
//! buffer.memory_of_mut(&span).fill(0xAA);
//!
//! // give it back and reuse it
//! buffer.release_span(&mut list, span);
//! let reused = buffer.alloc_from_list_node(16, 8, &mut list)?;
//! assert_eq!(reused.origin, span.origin);
//! # Ok::<(), carvalloc::AllocError>(())
//! ```
//!
//! # Implementation
//! Carving works on a span `[buf, buf + capacity)`. The algorithm is best
//! explained with an example. Each character is a byte, a node needs 24 bytes
//! at an alignment of 8 (which is the case on 64-bit targets).
//! 1.  A request of 16 bytes at alignment 4 is carved from a span starting at
//!     offset 9 with a capacity of 91 bytes.
//!     ```text
//!     ...p pppp pppp pppp pppp ____ ____ ____ ...
//!        ^ ^                   ^
//!        | pos = 12            end = 28
//!        origin = 9
//!     ```
//!     The payload starts at the first address aligned to 4 (`pos`). The
//!     payload is rounded up to its alignment, which determines `end`. The
//!     remaining 72 bytes can host a free-list node (at offset 32), so `end`
//!     stays where it is and the remaining capacity is reported as 72.
//! 2.  A request of 92 bytes at alignment 4 is carved from a span starting at
//!     offset 4 with a capacity of 96 bytes.
//!     ```text
//!     ____ pppp ... pppp xxxx|
//!          ^                 ^
//!          pos = origin = 4  end = 100
//!     ```
//!     Only 4 bytes would be left, which could never host a node. Those bytes
//!     would be lost forever, so they are added to the allocation instead:
//!     `end` is moved to the end of the span and the capacity becomes zero.
//! 3.  A request, that does not fit into the span after aligning it, fails
//!     with [`AllocError::OutOfMemory`]. Nothing is modified in that case.
//!
//! Reclaimed regions are tracked by [`FreeListNode`]s, which are stored in the
//! regions they describe. Allocating from the head node of the list carves
//! from its region just as above. Afterwards:
//! 1.  If the carve reached the end of the region, the node is gone: the list
//!     continues with the following node.
//!     ```text
//!     before: head -> [origin..........end] -> next
//!     after:  head -> next
//!     ```
//! 2.  Otherwise a new node is constructed in the leftover behind the
//!     allocation. It replaces the old node at the head of the list.
//!     ```text
//!     before: head -> [origin..........end] -> next
//!     after:  head -> [pppp][origin'...end] -> next
//!     ```
//!
//! Free nodes are never merged, even if they are adjacent. Searching the list
//! for a node, that is large enough, is up to the caller as well.
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod align;
mod carve;
mod error;
mod free_list;

pub use align::{align_within, checked_round_up_aligned, round_up_aligned};
pub use carve::{alloc_from_buf, fits_free_node, Span};
pub use error::AllocError;
pub use free_list::{
    Buffer, FreeList, FreeListNode, NodePtr, Nodes, FREE_LIST_NODE_ALIGN, FREE_LIST_NODE_SIZE,
};
