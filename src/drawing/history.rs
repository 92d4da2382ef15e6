//! Bounded linear snapshot history.

use image::RgbaImage;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 20;

/// Snapshots of the drawing raster with a cursor.
///
/// Never empty once constructed; `cursor` is always a valid index.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<RgbaImage>,
    cursor: usize,
    capacity: usize,
}

impl History {
    pub fn new(initial: RgbaImage) -> Self {
        Self::with_capacity(initial, HISTORY_CAPACITY)
    }

    pub fn with_capacity(initial: RgbaImage, capacity: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(capacity.max(1));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drop redo states, append, evict the oldest beyond capacity.
    pub fn commit(&mut self, snapshot: RgbaImage) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back; `None` at the oldest state.
    pub fn undo(&mut self) -> Option<&RgbaImage> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward; `None` at the newest state.
    pub fn redo(&mut self) -> Option<&RgbaImage> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    pub fn current(&self) -> Option<&RgbaImage> {
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
