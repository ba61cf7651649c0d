//! This module provides the free list of reclaimed regions.
//!
//! A region, that was handed out and is no longer needed, is turned into a
//! [`FreeListNode`]. The node is stored _inside_ the region it describes, so
//! the free list needs no memory of its own. The list itself is therefore just
//! the address of its first node (see [`FreeList`]), while all the nodes live
//! in the caller-supplied [`Buffer`].
mod buffer;
mod node;

pub use buffer::{Buffer, Nodes};
pub use node::{FreeListNode, NodePtr, FREE_LIST_NODE_ALIGN, FREE_LIST_NODE_SIZE};

use crate::carve::{alloc_from_buf, fits_free_node, Span};
use crate::error::AllocError;

/// A singly-linked list of reclaimed regions.
///
/// The list only stores the address of its head node. Every node links to the
/// next one, the last node has no `next`-link. Nodes are never merged, so the
/// list may contain adjacent regions.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FreeList {
    head: Option<NodePtr>,
}
impl FreeList {
    /// Create an empty free list.
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// The first node of the list, if any.
    pub const fn head(&self) -> Option<NodePtr> {
        self.head
    }

    /// Whether the list contains no nodes.
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl Buffer<'_> {
    /// Satisfy an allocation from the head node of `list`.
    ///
    /// This carves the request out of the region described by the head node
    /// (using [`alloc_from_buf()`]). Afterwards one of two things happens:
    /// 1.  The carve consumed the whole region (including a tail too small for
    ///     a node). The node is retired: the list now starts with the node,
    ///     that followed it.
    /// 2.  Some space is left after the carve. A new node for that leftover is
    ///     constructed right behind the allocation and takes the place of the
    ///     old node at the head of the list.
    ///
    /// So the list either shrinks by one node or keeps its length with a
    /// smaller head region, it never grows.
    ///
    /// The head node is copied out before anything is written, as its memory
    /// is reused either for the payload or for the replacement node.
    ///
    /// # Errors
    /// [`AllocError::OutOfMemory`] is returned if the list is empty or if the
    /// region of the head node cannot satisfy the request. The list and the
    /// node are left untouched in that case. The head node is the only one
    /// considered: searching the rest of the list is up to the caller (see
    /// [`nodes()`](Self::nodes)).
    pub fn alloc_from_list_node(
        &mut self,
        num_bytes: usize,
        alignment: usize,
        list: &mut FreeList,
    ) -> Result<Span, AllocError> {
        let Some(head) = list.head else {
            log::debug!("cannot carve {num_bytes} bytes from an empty free list");
            return Err(AllocError::OutOfMemory {
                requested: num_bytes,
                alignment,
                capacity: 0,
            });
        };
        let node = self[head];

        let mut capacity = node.capacity();
        let span = alloc_from_buf(node.origin(), num_bytes, alignment, &mut capacity)?;

        if span.end == node.end() {
            log::trace!("free-list node at {:#x} retired", head.addr());
            list.head = node.next();
        } else {
            let leftover = node.end() - span.end;
            list.head = Some(self.construct_free_node(span.end, leftover, node.next()));
        }
        Ok(span)
    }

    /// Push the region `[origin, origin + capacity)` onto the head of `list`.
    ///
    /// This is the way a granted region becomes reusable again. The caller has
    /// to guarantee, that the region is no longer in use.
    ///
    /// # Panics
    /// This function panics if the region cannot host a [`FreeListNode`] (check
    /// with [`fits_free_node()`](crate::fits_free_node) first) or if it lies
    /// outside of the buffer.
    pub fn release(&mut self, list: &mut FreeList, origin: usize, capacity: usize) -> NodePtr {
        let node = self.construct_free_node(origin, capacity, list.head);
        list.head = Some(node);
        node
    }

    /// Push the whole footprint of `span` onto the head of `list`.
    ///
    /// Returns `None` (and leaves the list untouched) if the footprint is too
    /// small to ever host a [`FreeListNode`]. Such a region is simply lost.
    pub fn release_span(&mut self, list: &mut FreeList, span: Span) -> Option<NodePtr> {
        fits_free_node(span.origin, span.footprint())
            .then(|| self.release(list, span.origin, span.footprint()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Buffer, FreeList, FREE_LIST_NODE_SIZE};
    use crate::align::round_up_aligned;
    use crate::error::AllocError;
    use crate::free_list::FREE_LIST_NODE_ALIGN;

    #[repr(align(8))]
    struct Memory([u8; 100]);

    /// Create a list with a single node spanning the whole buffer.
    fn whole_buffer(buffer: &mut Buffer<'_>) -> FreeList {
        let mut list = FreeList::new();
        let (start, len) = buffer.fresh_span();
        buffer.release(&mut list, start, len);
        list
    }

    #[test]
    fn empty_list() {
        let list = FreeList::new();
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list, FreeList::default());
    }

    #[test]
    fn split_node() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let start = buffer.start();
        let mut list = whole_buffer(&mut buffer);

        let num_bytes = 3 * 4;
        let span = buffer.alloc_from_list_node(num_bytes, 4, &mut list).unwrap();
        assert_eq!(span.origin, start);
        assert_eq!(span.pos, start);
        assert_eq!(span.end, start + num_bytes);

        let head = list.head().unwrap();
        let end = start + round_up_aligned(num_bytes, FREE_LIST_NODE_ALIGN);
        assert_eq!(head.addr(), end);
        assert_eq!(buffer[head].origin(), span.end);
        assert_eq!(buffer[head].capacity(), 100 - num_bytes);
        assert_eq!(buffer[head].next(), None);
    }

    #[test]
    fn retire_node() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let start = buffer.start();
        let mut list = whole_buffer(&mut buffer);

        let span = buffer.alloc_from_list_node(100, 1, &mut list).unwrap();
        assert_eq!(span.end, start + 100);
        assert!(list.is_empty());
    }

    #[test]
    fn retire_node_with_fragment() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let start = buffer.start();
        let mut list = whole_buffer(&mut buffer);

        let span = buffer
            .alloc_from_list_node(100 - FREE_LIST_NODE_SIZE + 1, 1, &mut list)
            .unwrap();
        assert_eq!(span.end, start + 100);
        assert!(list.is_empty());
    }

    #[test]
    fn empty_list_is_out_of_memory() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let mut list = FreeList::new();
        assert_eq!(
            buffer.alloc_from_list_node(8, 8, &mut list),
            Err(AllocError::OutOfMemory {
                requested: 8,
                alignment: 8,
                capacity: 0
            })
        );
    }

    #[test]
    fn too_large_request_leaves_list() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let mut list = whole_buffer(&mut buffer);
        let head = list.head();
        let node = buffer[head.unwrap()];

        assert!(buffer.alloc_from_list_node(101, 1, &mut list).is_err());
        assert_eq!(list.head(), head);
        assert_eq!(buffer[head.unwrap()], node);
    }

    #[test]
    fn release_pushes_to_head() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let start = buffer.start();
        let mut list = FreeList::new();

        let second = buffer.release(&mut list, start + 64, 36);
        let first = buffer.release(&mut list, start, 32);
        assert_eq!(list.head(), Some(first));
        assert_eq!(buffer[first].next(), Some(second));
        assert_eq!(buffer[second].next(), None);
    }

    #[test]
    fn release_too_small_span() {
        let mut memory = Memory([0; 100]);
        let mut buffer = Buffer::new(&mut memory.0);
        let (start, mut capacity) = buffer.fresh_span();
        let mut list = FreeList::new();

        let span = crate::alloc_from_buf(start, 1, 1, &mut capacity).unwrap();
        assert_eq!(buffer.release_span(&mut list, span), None);
        assert!(list.is_empty());

        let span = crate::alloc_from_buf(span.end, 32, 8, &mut capacity).unwrap();
        let node = buffer.release_span(&mut list, span).unwrap();
        assert_eq!(buffer[node].origin(), span.origin);
        assert_eq!(buffer[node].capacity(), span.footprint());
    }
}
