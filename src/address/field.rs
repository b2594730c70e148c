use crate::address::debounce::DebouncedSearch;
use crate::address::suggestions::{ListEvent, ListKey, SuggestionList};
use crate::address::traits::AddressSearch;
use crate::address::types::SearchOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// An address input with its dropdown and debounced search
pub struct AddressField {
    input: String,
    list: SuggestionList,
    search: DebouncedSearch,
    updates: watch::Receiver<SearchOutcome>,
}

impl AddressField {
    pub fn new(search: Arc<dyn AddressSearch>, delay: Duration, limit: usize) -> Self {
        let search = DebouncedSearch::new(search, delay, limit);
        let updates = search.subscribe();
        Self {
            input: String::new(),
            list: SuggestionList::new(),
            search,
            updates,
        }
    }

    /// Start from a previously saved label (back-navigation, reload)
    pub fn with_text(mut self, text: &str) -> Self {
        self.input = text.to_string();
        self
    }

    pub fn text(&self) -> &str {
        &self.input
    }

    pub fn list(&self) -> &SuggestionList {
        &self.list
    }

    /// A keystroke changed the input value
    pub fn type_text(&mut self, text: &str) {
        self.input = text.to_string();
        self.search.submit(text);
    }

    /// Apply the newest search outcome if it answers the current input.
    /// Returns whether the list changed.
    pub fn apply_latest(&mut self) -> bool {
        if !self.updates.has_changed().unwrap_or(false) {
            return false;
        }
        let outcome = self.updates.borrow_and_update().clone();
        self.apply(outcome)
    }

    /// Wait for the next search outcome and apply it
    pub async fn next_results(&mut self) -> bool {
        if self.updates.changed().await.is_err() {
            return false;
        }
        let outcome = self.updates.borrow_and_update().clone();
        self.apply(outcome)
    }

    fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.query != self.input.trim() {
            return false;
        }
        self.list.show(outcome.suggestions);
        true
    }

    /// Keyboard handling; a selection replaces the input text with its label
    pub fn key(&mut self, key: ListKey) -> ListEvent {
        let event = self.list.handle_key(key);
        self.after(&event);
        event
    }

    pub fn click(&mut self, index: usize) -> ListEvent {
        let event = self.list.click(index);
        self.after(&event);
        event
    }

    pub fn click_outside(&mut self) -> ListEvent {
        self.list.click_outside()
    }

    pub fn focus(&mut self) {
        self.list.focus();
    }

    fn after(&mut self, event: &ListEvent) {
        if let ListEvent::Selected(suggestion) = event {
            self.search.cancel();
            self.input = suggestion.label.clone();
        }
    }
}
