use ratatui::widgets::ListState;

/// A list of server items with a movable selection
pub struct ItemList<T> {
    pub state: ListState,
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        ItemList {
            state: ListState::default(),
            items: Vec::new(),
        }
    }
}

impl<T> ItemList<T> {
    // Replace the items after a fetch, keeping the selection in range
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        match self.state.selected() {
            Some(_) if self.items.is_empty() => self.state.select(None),
            Some(i) if i >= self.items.len() => self.state.select(Some(self.items.len() - 1)),
            _ => {}
        }
    }

    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    // Move the selection to the next item, wrapping around
    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item, wrapping around
    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn get_selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut list = ItemList::default();
        list.set_items(vec!["a", "b", "c"]);
        list.previous();
        assert_eq!(list.get_selected(), Some(&"c"));
        list.next();
        assert_eq!(list.get_selected(), Some(&"a"));
        list.next();
        assert_eq!(list.get_selected(), Some(&"b"));
    }

    #[test]
    fn shrinking_items_clamps_selection() {
        let mut list = ItemList::default();
        list.set_items(vec![1, 2, 3]);
        list.previous();
        list.set_items(vec![1]);
        assert_eq!(list.get_selected(), Some(&1));
        list.clear();
        assert_eq!(list.get_selected(), None);
        list.next();
        assert_eq!(list.state.selected(), None);
    }
}
