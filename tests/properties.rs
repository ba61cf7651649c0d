use carvalloc::{
    alloc_from_buf, fits_free_node, round_up_aligned, Buffer, FreeList, FREE_LIST_NODE_ALIGN,
    FREE_LIST_NODE_SIZE,
};
use proptest::prelude::*;

// an arbitrary base address; carving is pure arithmetic and touches no memory
const BASE: usize = 0x10_0000;

#[repr(align(8))]
struct Memory([u8; 512]);

proptest! {
    #[test]
    fn rounding_is_idempotent(num_bytes in 0usize..1 << 40, shift in 0u32..16) {
        let alignment = 1 << shift;
        let rounded = round_up_aligned(num_bytes, alignment);

        prop_assert!(rounded >= num_bytes);
        prop_assert!(rounded - num_bytes < alignment);
        prop_assert_eq!(rounded % alignment, 0);
        prop_assert_eq!(round_up_aligned(rounded, alignment), rounded);
    }

    #[test]
    fn carving_is_monotonic(
        offset in 0usize..64,
        num_bytes in 0usize..512,
        shift in 0u32..7,
        available in 0usize..1024,
    ) {
        let alignment = 1 << shift;
        let buf = BASE + offset;
        let mut capacity = available;

        match alloc_from_buf(buf, num_bytes, alignment, &mut capacity) {
            Ok(span) => {
                prop_assert_eq!(span.origin, buf);
                prop_assert!(span.pos >= buf);
                prop_assert_eq!(span.pos % alignment, 0);
                prop_assert!(span.end >= span.pos + num_bytes);
                prop_assert_eq!(span.end + capacity, buf + available);
                // the leftover is either usable for a node or nothing at all
                prop_assert!(capacity == 0 || fits_free_node(span.end, capacity));
            }
            Err(_) => {
                prop_assert_eq!(capacity, available);
                let padding = round_up_aligned(buf, alignment) - buf;
                prop_assert!(padding + round_up_aligned(num_bytes, alignment) > available);
            }
        }
    }

    #[test]
    fn room_is_preserved_or_swallowed(
        offset in 0usize..64,
        num_bytes in 0usize..512,
        shift in 0u32..7,
        available in 0usize..1024,
    ) {
        let alignment = 1 << shift;
        let buf = BASE + offset;
        let mut capacity = available;

        if let Ok(span) = alloc_from_buf(buf, num_bytes, alignment, &mut capacity) {
            let payload_end = span.pos + round_up_aligned(num_bytes, alignment);
            let leftover = buf + available - payload_end;
            if leftover == 0 || fits_free_node(payload_end, leftover) {
                prop_assert_eq!(span.end, payload_end);
                prop_assert_eq!(capacity, leftover);
            } else {
                prop_assert!(leftover < FREE_LIST_NODE_SIZE + FREE_LIST_NODE_ALIGN);
                prop_assert_eq!(span.end, buf + available);
                prop_assert_eq!(capacity, 0);
            }
        }
    }

    #[test]
    fn free_node_is_retired_or_split(
        offset in 0usize..16,
        len in FREE_LIST_NODE_SIZE + 16..400usize,
        num_bytes in 0usize..400,
        shift in 0u32..5,
    ) {
        let alignment = 1 << shift;
        let mut memory = Memory([0; 512]);
        let mut buffer = Buffer::new(&mut memory.0);
        let origin = buffer.start() + offset;

        let mut list = FreeList::new();
        let next = buffer.release(&mut list, buffer.start() + 448, 64);
        buffer.release(&mut list, origin, len);
        let before = list.head();

        match buffer.alloc_from_list_node(num_bytes, alignment, &mut list) {
            Ok(span) if span.end == origin + len => {
                prop_assert_eq!(list.head(), Some(next));
            }
            Ok(span) => {
                let head = list.head().unwrap();
                prop_assert_eq!(buffer[head].origin(), span.end);
                prop_assert_eq!(buffer[head].end(), origin + len);
                prop_assert_eq!(buffer[head].next(), Some(next));
            }
            Err(_) => {
                prop_assert_eq!(list.head(), before);
                prop_assert_eq!(buffer[before.unwrap()].capacity(), len);
            }
        }
    }
}
