use super::node::{FreeListNode, NodePtr, FREE_LIST_NODE_ALIGN, FREE_LIST_NODE_SIZE};
use super::FreeList;
use crate::align::align_within;
use crate::carve::Span;

/// The caller-supplied memory, that free-list nodes are placed into.
///
/// All addresses handed to a [`Buffer`] are absolute addresses (as produced by
/// [`alloc_from_buf()`](crate::alloc_from_buf)). Before any memory is touched,
/// the buffer checks that the address lies inside the wrapped slice and, for
/// nodes, that it is properly aligned. A violation is a programming error and
/// results in a panic.
///
/// The buffer wraps initialized bytes (`&mut [u8]`): since every bit pattern is
/// a valid [`FreeListNode`], reading a node can never observe uninitialized
/// memory, even if the caller mixes up addresses.
pub struct Buffer<'buf> {
    memory: &'buf mut [u8],
}
impl<'buf> Buffer<'buf> {
    /// Wrap the given memory.
    pub fn new(memory: &'buf mut [u8]) -> Self {
        Self { memory }
    }

    /// The address of the first byte of the buffer.
    pub fn start(&self) -> usize {
        self.memory.as_ptr() as usize
    }

    /// One past the address of the last byte of the buffer.
    pub fn end(&self) -> usize {
        self.start() + self.memory.len()
    }

    /// The number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Whether the buffer has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// The start address and capacity of the untouched buffer, ready to be
    /// passed to [`alloc_from_buf()`](crate::alloc_from_buf).
    pub fn fresh_span(&self) -> (usize, usize) {
        (self.start(), self.len())
    }

    /// Translate the address range `[addr, addr + len)` into an offset.
    ///
    /// # Panics
    /// This function panics if the range does not lie inside the buffer.
    fn offset_of(&self, addr: usize, len: usize) -> usize {
        let offset = addr.wrapping_sub(self.start());
        assert!(
            addr >= self.start() && offset <= self.len() && len <= self.len() - offset,
            "address range {addr:#x}+{len} lies outside of the buffer"
        );
        offset
    }

    /// Obtain a reference to the node stored at `addr`.
    ///
    /// # Panics
    /// This function panics if `addr` is not aligned for a [`FreeListNode`] or
    /// if the node would reach past the end of the buffer.
    #[allow(clippy::cast_ptr_alignment)] // alignment is asserted
    fn at(&self, addr: usize) -> &FreeListNode {
        assert!(
            addr % FREE_LIST_NODE_ALIGN == 0,
            "free-list node at {addr:#x} is misaligned"
        );
        let offset = self.offset_of(addr, FREE_LIST_NODE_SIZE);

        // SAFETY: this dereference needs the read to be in bounds, aligned and
        // to produce a valid value.
        // 1. the bounds are checked by `offset_of()`, so all bytes of the node
        //    are part of `self.memory`.
        // 2. the absolute address is checked to be a multiple of the alignment
        //    of the node above.
        // 3. the memory consists of initialized bytes (the buffer wraps a
        //    `[u8]`) and `FreeListNode` is made of three word-sized integers
        //    without padding, where every bit pattern is valid (the niche of
        //    `Option<NodePtr>` is `0`, which simply reads as `None`).
        unsafe { &*self.memory.as_ptr().add(offset).cast::<FreeListNode>() }
    }

    /// Store `node` at `addr` and return the address as a [`NodePtr`].
    ///
    /// # Panics
    /// Same as [`at()`](Self::at).
    #[allow(clippy::cast_ptr_alignment)] // alignment is asserted
    fn write(&mut self, addr: usize, node: FreeListNode) -> NodePtr {
        assert!(
            addr % FREE_LIST_NODE_ALIGN == 0,
            "free-list node at {addr:#x} is misaligned"
        );
        let offset = self.offset_of(addr, FREE_LIST_NODE_SIZE);

        // SAFETY: same as `at()`. The write initializes all bytes of the node,
        // since the node has no padding, so the buffer stays fully initialized.
        unsafe {
            self.memory
                .as_mut_ptr()
                .add(offset)
                .cast::<FreeListNode>()
                .write(node);
        }
        let Some(ptr) = NodePtr::new(addr) else {
            unreachable!("a slice never contains the null address");
        };
        ptr
    }

    /// Construct a free-list node describing the region `[pos, pos + capacity)`
    /// inside that very region.
    ///
    /// The node is placed at the first address inside the region, that is
    /// suitably aligned for a [`FreeListNode`]. It records `pos` as its origin,
    /// `capacity` as its capacity and the given `next`-link.
    ///
    /// # Panics
    /// Callers must only construct a node in a region known to be large enough
    /// (see [`fits_free_node()`](crate::fits_free_node)). This function panics
    /// if the region cannot host the node or lies outside the buffer.
    pub fn construct_free_node(
        &mut self,
        pos: usize,
        capacity: usize,
        next: Option<NodePtr>,
    ) -> NodePtr {
        self.offset_of(pos, capacity);
        let Some((addr, _)) =
            align_within(FREE_LIST_NODE_ALIGN, FREE_LIST_NODE_SIZE, pos, capacity)
        else {
            panic!("region {pos:#x}+{capacity} is too small for a free-list node");
        };
        let node = self.write(addr, FreeListNode::new(pos, capacity, next));
        log::trace!("free-list node at {addr:#x} for {pos:#x}+{capacity}");
        node
    }

    /// The memory granted by `span`, i.e. the bytes from `pos` to `end`.
    ///
    /// # Panics
    /// This function panics, if the span does not lie inside the buffer.
    pub fn memory_of(&self, span: &Span) -> &[u8] {
        let (offset, len) = self.payload_of(span);
        &self.memory[offset..offset + len]
    }

    /// The mutable memory granted by `span`.
    ///
    /// Please see [`memory_of()`](Self::memory_of) for details.
    pub fn memory_of_mut(&mut self, span: &Span) -> &mut [u8] {
        let (offset, len) = self.payload_of(span);
        &mut self.memory[offset..offset + len]
    }

    /// The offset and length of the payload of `span`.
    ///
    /// # Panics
    /// This function panics, if the payload does not lie inside the buffer. A
    /// span ending before its payload starts never does.
    fn payload_of(&self, span: &Span) -> (usize, usize) {
        let len = span.end.checked_sub(span.pos).unwrap_or(usize::MAX);
        (self.offset_of(span.pos, len), len)
    }

    /// Iterate over the addresses of the nodes of `list`, head first.
    pub fn nodes<'a>(&'a self, list: &FreeList) -> Nodes<'a, 'buf> {
        Nodes {
            buffer: self,
            next: list.head(),
        }
    }
}
impl core::ops::Index<NodePtr> for Buffer<'_> {
    type Output = FreeListNode;

    fn index(&self, index: NodePtr) -> &Self::Output {
        self.at(index.addr())
    }
}
impl core::fmt::Debug for Buffer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("start", &format_args!("{:#x}", self.start()))
            .field("len", &self.len())
            .finish()
    }
}

/// An iterator over the nodes of a [`FreeList`].
///
/// Created by [`Buffer::nodes()`].
pub struct Nodes<'a, 'buf> {
    buffer: &'a Buffer<'buf>,
    next: Option<NodePtr>,
}
impl Iterator for Nodes<'_, '_> {
    type Item = NodePtr;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.buffer[current].next();
        Some(current)
    }
}
