//! Alignment arithmetic on byte counts and raw addresses.
//!
//! Every alignment passed around in this crate is a power of two. The
//! functions here do not touch memory: they only compute where something
//! _would_ be placed.

/// Round `num_bytes` up to the next multiple of `alignment`.
///
/// A value, that is already a multiple of `alignment` is returned unchanged,
/// and an alignment of `1` is a no-op.
/// ```
/// use carvalloc::round_up_aligned;
///
/// assert_eq!(round_up_aligned(9, 4), 12);
/// assert_eq!(round_up_aligned(12, 4), 12);
/// assert_eq!(round_up_aligned(13, 1), 13);
/// assert_eq!(round_up_aligned(16, 512), 512);
/// ```
///
/// # Panics
/// This function panics, if `alignment` is zero or if the rounded value is not
/// representable as `usize`. Use [`checked_round_up_aligned`] to handle the
/// latter case.
pub const fn round_up_aligned(num_bytes: usize, alignment: usize) -> usize {
    match checked_round_up_aligned(num_bytes, alignment) {
        Some(rounded) => rounded,
        None => panic!("rounded size overflows usize"),
    }
}

/// Round `num_bytes` up to the next multiple of `alignment`, returning `None`
/// on overflow.
pub const fn checked_round_up_aligned(num_bytes: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    let remaining = num_bytes % alignment;
    if remaining == 0 {
        return Some(num_bytes);
    }
    num_bytes.checked_add(alignment - remaining)
}

/// Find the first address in a span that can hold `size` bytes at the given
/// alignment.
///
/// The span starts at `addr` and is `capacity` bytes long. On success the
/// aligned address is returned together with the capacity left from that
/// address onwards (i.e. `capacity` minus the padding that was skipped). If
/// the aligned `size` bytes would not fit into the span, `None` is returned.
///
/// This mirrors the well-known `align`-primitive of other languages, but
/// leaves the inputs untouched and reports the result instead.
pub const fn align_within(
    alignment: usize,
    size: usize,
    addr: usize,
    capacity: usize,
) -> Option<(usize, usize)> {
    let aligned = match checked_round_up_aligned(addr, alignment) {
        Some(aligned) => aligned,
        None => return None,
    };
    let padding = aligned - addr;
    match padding.checked_add(size) {
        Some(needed) if needed <= capacity => Some((aligned, capacity - padding)),
        _ => None,
    }
}
