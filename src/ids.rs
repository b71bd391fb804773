use std::collections::HashSet;

/// Remembers every id ever handed out or loaded so none is reused, even
/// after the vehicle carrying it is removed.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    used: HashSet<i64>,
    // Lowest id that might still be free. The set only grows, so this never
    // has to move backwards.
    cursor: i64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest id, scanning upward from 0, that has never been seen.
    pub fn allocate(&mut self) -> i64 {
        while self.used.contains(&self.cursor) {
            self.cursor += 1;
        }
        let id = self.cursor;
        self.used.insert(id);
        id
    }

    /// Marks an externally supplied id as taken. Returns false if it already was.
    pub fn register(&mut self, id: i64) -> bool {
        self.used.insert(id)
    }

    pub fn is_used(&self, id: i64) -> bool {
        self.used.contains(&id)
    }
}
