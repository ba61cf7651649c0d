//! Carving aligned allocations out of a raw span of memory.
//!
//! This is the bump-allocation half of the crate: given the start address of
//! some available memory and how many bytes are usable from there, produce an
//! aligned [`Span`] for a request and report how much capacity remains.
use crate::align::{align_within, checked_round_up_aligned};
use crate::error::AllocError;
use crate::free_list::{FREE_LIST_NODE_ALIGN, FREE_LIST_NODE_SIZE};

/// The result of carving an allocation out of a span.
///
/// All three fields are addresses. They satisfy `origin <= pos <= end` and
/// `pos` is aligned to the requested alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start of the carved region before any alignment adjustment.
    pub origin: usize,
    /// Aligned start of the payload granted to the caller.
    pub pos: usize,
    /// One past the space consumed by this allocation.
    ///
    /// This is not necessarily `pos + size`: the payload is rounded up to its
    /// alignment and a trailing fragment too small to ever host a free-list
    /// node is swallowed as well.
    pub end: usize,
}
impl Span {
    /// The number of bytes from `pos` to `end`, i.e. the usable payload.
    ///
    /// # Panics
    /// This function panics, if the span violates `pos <= end`, which can only
    /// happen for a span, that was not produced by this crate.
    pub const fn payload_len(&self) -> usize {
        match self.end.checked_sub(self.pos) {
            Some(len) => len,
            None => panic!("span ends before its payload starts"),
        }
    }

    /// The number of bytes from `origin` to `end`, i.e. the whole footprint
    /// including the alignment padding in front of the payload.
    ///
    /// # Panics
    /// This function panics, if the span violates `origin <= end`.
    pub const fn footprint(&self) -> usize {
        match self.end.checked_sub(self.origin) {
            Some(len) => len,
            None => panic!("span ends before its origin"),
        }
    }
}

/// Carve `num_bytes` at `alignment` out of the span `[buf, buf + capacity)`.
///
/// On success `capacity` is updated to the number of bytes left after the
/// returned [`Span::end`], so `buf + old_capacity == span.end + capacity`
/// always holds. The leftover is either large enough to host a free-list node
/// (see [`FREE_LIST_NODE_SIZE`]) or it is zero: a smaller fragment could never
/// be tracked, so it is folded into the allocation.
///
/// # Errors
/// [`AllocError::OutOfMemory`] is returned if the request, rounded up to
/// `alignment`, does not fit behind the first aligned address of the span, or
/// if the span reaches past the end of the address space. `capacity` is not
/// modified in that case.
///
/// # Panics
/// This function panics if `alignment` is not a power of two.
pub fn alloc_from_buf(
    buf: usize,
    num_bytes: usize,
    alignment: usize,
    capacity: &mut usize,
) -> Result<Span, AllocError> {
    assert!(alignment.is_power_of_two(), "alignment must be a power of two");
    let available = *capacity;
    // once `buf + available` is known to fit, no address inside the span
    // can overflow
    let carved = buf
        .checked_add(available)
        .and_then(|_| checked_round_up_aligned(num_bytes, alignment))
        .and_then(|true_num_bytes| {
            let (pos, remaining) = align_within(alignment, true_num_bytes, buf, available)?;
            let end = pos.checked_add(true_num_bytes)?;
            Some((pos, end, remaining - true_num_bytes))
        });
    let Some((pos, end, remaining)) = carved else {
        log::debug!(
            "cannot carve {num_bytes} bytes (align {alignment}) from {buf:#x}+{available}"
        );
        return Err(AllocError::OutOfMemory {
            requested: num_bytes,
            alignment,
            capacity: available,
        });
    };

    let origin = buf;
    let end = if remaining == 0 || fits_free_node(end, remaining) {
        *capacity = remaining;
        end
    } else {
        *capacity = 0;
        end + remaining
    };
    log::trace!("carved {origin:#x}: pos {pos:#x}, end {end:#x}, {} bytes left", *capacity);
    Ok(Span { origin, pos, end })
}

/// Check whether the span `[addr, addr + capacity)` can host a free-list node.
pub const fn fits_free_node(addr: usize, capacity: usize) -> bool {
    align_within(FREE_LIST_NODE_ALIGN, FREE_LIST_NODE_SIZE, addr, capacity).is_some()
}
