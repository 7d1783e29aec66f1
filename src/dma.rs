//! Linear bump allocator for environments without a heap allocator,
//! gated behind the `dma-free` feature. Grounded on
//! `examples/original_source/dma.c`/`dma.h`'s `h8_dma_alloc`/
//! `h8_dma_free`/`h8_dma_set_oom_cb`: a fixed-size static arena,
//! allocated purely linearly, that never frees.
//!
//! The donor hands back raw pointers into a static `h8_u8[]` heap; that
//! API has no safe Rust equivalent. `DmaArena::alloc` instead returns an
//! index range into the arena's own backing buffer, read back through
//! `DmaArena::get`/`get_mut`.

use std::ops::Range;

pub const DMA_ARENA_SIZE: usize = 0x4000;

pub struct DmaArena {
    heap: Box<[u8; DMA_ARENA_SIZE]>,
    cursor: usize,
    on_out_of_memory: Option<Box<dyn FnMut()>>,
}

impl DmaArena {
    pub fn new() -> Self {
        DmaArena { heap: Box::new([0u8; DMA_ARENA_SIZE]), cursor: 0, on_out_of_memory: None }
    }

    pub fn set_out_of_memory_hook(&mut self, cb: Box<dyn FnMut()>) {
        self.on_out_of_memory = Some(cb);
    }

    /// Bump-allocates `size` bytes, optionally zeroing them, and returns
    /// the index range they occupy. Never frees, matching the donor's
    /// `h8_dma_free` no-op.
    pub fn alloc(&mut self, size: usize, zero: bool) -> Option<Range<usize>> {
        if size > DMA_ARENA_SIZE - self.cursor {
            if let Some(cb) = self.on_out_of_memory.as_mut() {
                cb();
            }
            return None;
        }
        let range = self.cursor..self.cursor + size;
        if zero {
            self.heap[range.clone()].fill(0);
        }
        self.cursor += size;
        Some(range)
    }

    pub fn get(&self, range: Range<usize>) -> &[u8] {
        &self.heap[range]
    }

    pub fn get_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        &mut self.heap[range]
    }
}

impl Default for DmaArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_allocations_do_not_overlap() {
        let mut arena = DmaArena::new();
        let a = arena.alloc(16, false).unwrap();
        let b = arena.alloc(16, false).unwrap();
        assert_eq!(a, 0..16);
        assert_eq!(b, 16..32);
    }

    #[test]
    fn zeroing_clears_the_allocated_range() {
        let mut arena = DmaArena::new();
        let range = arena.alloc(4, false).unwrap();
        arena.get_mut(range).copy_from_slice(&[1, 2, 3, 4]);
        let range2 = arena.alloc(4, true).unwrap();
        assert_eq!(arena.get(range2), &[0, 0, 0, 0]);
    }

    #[test]
    fn exhausting_the_arena_invokes_the_oom_hook_and_returns_none() {
        let mut arena = DmaArena::new();
        let hit = std::rc::Rc::new(std::cell::Cell::new(false));
        let hit_clone = hit.clone();
        arena.set_out_of_memory_hook(Box::new(move || hit_clone.set(true)));
        assert!(arena.alloc(DMA_ARENA_SIZE + 1, false).is_none());
        assert!(hit.get());
    }
}
