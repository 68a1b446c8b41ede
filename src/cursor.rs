/// Where a dataset cursor currently points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorPosition {
    #[default]
    BeforeFirst,
    At(usize),
    AfterLast,
}

/// Cursor state over a sequence whose length is supplied on every move.
///
/// The cursor does not own the sequence, so callers that shrink the sequence
/// call [`Cursor::clamp`] afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    position: CursorPosition,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    /// Index of the current item, if the cursor is on one.
    pub fn current(&self) -> Option<usize> {
        match self.position {
            CursorPosition::At(i) => Some(i),
            _ => None,
        }
    }

    pub fn move_next(&mut self, len: usize) -> bool {
        let next = match self.position {
            CursorPosition::BeforeFirst => 0,
            CursorPosition::At(i) => i + 1,
            CursorPosition::AfterLast => return false,
        };
        self.move_to(next, len)
    }

    pub fn move_previous(&mut self, len: usize) -> bool {
        self.position = match self.position {
            CursorPosition::AfterLast if len > 0 => CursorPosition::At(len - 1),
            CursorPosition::At(i) if i > 0 => CursorPosition::At(i - 1),
            _ => CursorPosition::BeforeFirst,
        };
        self.current().is_some()
    }

    pub fn move_before_first(&mut self) -> bool {
        self.position = CursorPosition::BeforeFirst;
        true
    }

    pub fn move_first(&mut self, len: usize) -> bool {
        if len == 0 {
            self.position = CursorPosition::BeforeFirst;
            return false;
        }
        self.position = CursorPosition::At(0);
        true
    }

    pub fn move_last(&mut self, len: usize) -> bool {
        if len == 0 {
            self.position = CursorPosition::BeforeFirst;
            return false;
        }
        self.position = CursorPosition::At(len - 1);
        true
    }

    /// Jumps to item `i`. Past the end, the cursor ends up after the last item.
    pub fn move_to(&mut self, i: usize, len: usize) -> bool {
        if i < len {
            self.position = CursorPosition::At(i);
            true
        } else {
            self.position = CursorPosition::AfterLast;
            false
        }
    }

    pub fn is_at_begin(&self) -> bool {
        self.position == CursorPosition::At(0)
    }

    pub fn is_before_begin(&self) -> bool {
        self.position == CursorPosition::BeforeFirst
    }

    pub fn is_at_end(&self, len: usize) -> bool {
        len > 0 && self.position == CursorPosition::At(len - 1)
    }

    pub fn is_after_end(&self) -> bool {
        self.position == CursorPosition::AfterLast
    }

    /// Re-validates the position after the sequence shrank to `len`.
    pub fn clamp(&mut self, len: usize) {
        if let CursorPosition::At(i) = self.position
            && i >= len
        {
            self.position = CursorPosition::AfterLast;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_iteration_visits_each_item_once() {
        let mut cursor = Cursor::new();
        assert!(cursor.is_before_begin());

        let mut visited = Vec::new();
        while cursor.move_next(3) {
            visited.push(cursor.current().unwrap());
        }
        assert_eq!(visited, vec![0, 1, 2]);
        assert!(cursor.is_after_end());
        assert!(!cursor.move_next(3));
    }

    #[test]
    fn backward_iteration_reaches_the_first_item() {
        let mut cursor = Cursor::new();
        assert!(cursor.move_last(3));
        assert!(cursor.is_at_end(3));

        assert!(cursor.move_previous(3));
        assert!(cursor.move_previous(3));
        assert!(cursor.is_at_begin());
        assert_eq!(cursor.current(), Some(0));

        assert!(!cursor.move_previous(3));
        assert!(cursor.is_before_begin());
        assert!(!cursor.move_previous(3));
    }

    #[test]
    fn previous_from_after_last_lands_on_last() {
        let mut cursor = Cursor::new();
        while cursor.move_next(2) {}
        assert!(cursor.move_previous(2));
        assert_eq!(cursor.current(), Some(1));
    }

    #[test]
    fn move_to_out_of_range_is_after_end() {
        let mut cursor = Cursor::new();
        assert!(cursor.move_to(1, 2));
        assert!(cursor.is_at_end(2));
        assert!(!cursor.move_to(2, 2));
        assert!(cursor.is_after_end());
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn empty_sequence() {
        let mut cursor = Cursor::new();
        assert!(!cursor.move_first(0));
        assert!(!cursor.move_last(0));
        assert!(!cursor.move_next(0));
        assert!(cursor.is_after_end());
        assert!(!cursor.is_at_end(0));
        assert!(cursor.move_before_first());
        assert!(cursor.is_before_begin());
    }

    #[test]
    fn clamp_after_shrinking() {
        let mut cursor = Cursor::new();
        cursor.move_last(3);
        cursor.clamp(2);
        assert!(cursor.is_after_end());

        cursor.move_first(2);
        cursor.clamp(1);
        assert_eq!(cursor.current(), Some(0));
    }
}
