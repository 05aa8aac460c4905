/// Running allocator for one ordering sequence (`order` within a part of an
/// exam, or `global_order` within an exam).
///
/// Seeded from the current maximum of the scope, soft-deleted rows included,
/// so values are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCursor {
    next: i32,
}

impl OrderCursor {
    pub fn after(current_max: Option<i32>) -> Self {
        Self {
            next: current_max.unwrap_or(0) + 1,
        }
    }

    pub fn peek(&self) -> i32 {
        self.next
    }

    pub fn advance(&mut self) -> i32 {
        let value = self.next;
        self.next += 1;
        value
    }
}
