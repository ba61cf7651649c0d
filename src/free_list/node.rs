//! The free-list node, which lives inside the region it describes.
use core::mem;
use core::num::NonZeroUsize;

/// The number of bytes a [`FreeListNode`] occupies.
pub const FREE_LIST_NODE_SIZE: usize = mem::size_of::<FreeListNode>();
/// The alignment a [`FreeListNode`] requires.
pub const FREE_LIST_NODE_ALIGN: usize = mem::align_of::<FreeListNode>();

// The node is written into caller memory as plain bytes, so it must not have
// padding (which would be uninitialized).
const _: () = assert!(FREE_LIST_NODE_SIZE == 3 * mem::size_of::<usize>());
const _: () = assert!(FREE_LIST_NODE_ALIGN == mem::align_of::<usize>());

/// The address of a [`FreeListNode`] inside a [`Buffer`](super::Buffer).
///
/// Node addresses are only handed out by the buffer after the node was
/// written, but every access re-validates the address anyway, so a pointer
/// used with the wrong buffer results in a panic rather than a bogus read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodePtr(NonZeroUsize);
impl NodePtr {
    /// Wrap a node address. Address `0` never hosts a node.
    pub(crate) const fn new(addr: usize) -> Option<Self> {
        match NonZeroUsize::new(addr) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }

    /// The address of the node.
    pub const fn addr(self) -> usize {
        self.0.get()
    }
}

/// A reclaimed, currently unused region of memory.
///
/// The node describes the region `[origin, origin + capacity)` and is itself
/// stored at an aligned address inside that region. The `next`-link is either
/// the next node of the free list or `None` for the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FreeListNode {
    origin: usize,
    capacity: usize,
    next: Option<NodePtr>,
}
impl FreeListNode {
    /// Create a node describing `capacity` bytes starting at `origin`.
    pub(crate) const fn new(origin: usize, capacity: usize, next: Option<NodePtr>) -> Self {
        Self {
            origin,
            capacity,
            next,
        }
    }

    /// The start address of the described region.
    pub const fn origin(&self) -> usize {
        self.origin
    }

    /// The number of bytes available from [`origin`](Self::origin) onwards.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// One past the last byte of the described region.
    ///
    /// # Panics
    /// This function panics if the region reaches past the end of the address
    /// space. A node constructed by a [`Buffer`](super::Buffer) never does.
    pub fn end(&self) -> usize {
        self.origin.checked_add(self.capacity).unwrap_or_else(|| {
            panic!(
                "free-list node region {:#x}+{} overflows the address space",
                self.origin, self.capacity
            )
        })
    }

    /// The next node of the free list, if any.
    pub const fn next(&self) -> Option<NodePtr> {
        self.next
    }
}
