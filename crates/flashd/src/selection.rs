use flashcore_index::SearchResult;

pub const PAGE_JUMP: usize = 12;

/// Committed results plus the keyboard cursor into them.
///
/// The cursor is `None` or a valid index; every mutation goes through a
/// method that keeps it that way.
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    items: Vec<SearchResult>,
    selected: Option<usize>,
}

impl ResultList {
    pub fn items(&self) -> &[SearchResult] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&SearchResult> {
        self.selected.and_then(|index| self.items.get(index))
    }

    /// New results always start unselected.
    pub fn replace(&mut self, items: Vec<SearchResult>) {
        self.items = items;
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn move_next(&mut self) -> Option<usize> {
        self.step_forward(1)
    }

    pub fn move_previous(&mut self) -> Option<usize> {
        self.step_back(1)
    }

    pub fn page_down(&mut self) -> Option<usize> {
        self.step_forward(PAGE_JUMP)
    }

    pub fn page_up(&mut self) -> Option<usize> {
        self.step_back(PAGE_JUMP)
    }

    pub fn move_first(&mut self) -> Option<usize> {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
        self.selected
    }

    pub fn move_last(&mut self) -> Option<usize> {
        if let Some(last) = self.items.len().checked_sub(1) {
            self.selected = Some(last);
        }
        self.selected
    }

    /// Pointer selection. Out-of-range indices are refused.
    pub fn select_at(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    fn step_forward(&mut self, by: usize) -> Option<usize> {
        let Some(last) = self.items.len().checked_sub(1) else {
            return None;
        };
        self.selected = Some(match self.selected {
            None => (by - 1).min(last),
            Some(current) => current.saturating_add(by).min(last),
        });
        self.selected
    }

    fn step_back(&mut self, by: usize) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(current) => current.saturating_sub(by),
        });
        self.selected
    }
}
