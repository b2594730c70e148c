use crate::models::AddressSuggestion;
use tracing::debug;

/// Keys the suggestion dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// What a key press or click did to the list
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// A suggestion was chosen; the dropdown is closed
    Selected(AddressSuggestion),
    /// The chosen suggestion has an unsupported classification
    Rejected(String),
    /// Escape or outside click closed the dropdown
    Dismissed,
    /// Nothing to do (empty list, closed dropdown)
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Closed,
    Open,
}

/// Dropdown of address suggestions with keyboard navigation
#[derive(Debug, Default)]
pub struct SuggestionList {
    suggestions: Vec<AddressSuggestion>,
    highlighted: Option<usize>,
    state: ListState,
    error: Option<String>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the suggestions; opens the dropdown when there is at least one
    pub fn show(&mut self, suggestions: Vec<AddressSuggestion>) {
        self.state = if suggestions.is_empty() {
            ListState::Closed
        } else {
            ListState::Open
        };
        self.suggestions = suggestions;
        self.highlighted = None;
    }

    pub fn suggestions(&self) -> &[AddressSuggestion] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ListState::Open
    }

    /// Validation message left by the last rejected selection
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_key(&mut self, key: ListKey) -> ListEvent {
        if !self.is_open() || self.suggestions.is_empty() {
            return ListEvent::Ignored;
        }

        let len = self.suggestions.len();
        match key {
            ListKey::ArrowDown => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) => (i + 1) % len,
                    None => 0,
                });
                ListEvent::Ignored
            }
            ListKey::ArrowUp => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) => (i + len - 1) % len,
                    None => len - 1,
                });
                ListEvent::Ignored
            }
            ListKey::Enter => self.select(self.highlighted.unwrap_or(0)),
            ListKey::Escape => {
                self.dismiss();
                ListEvent::Dismissed
            }
        }
    }

    /// Pointer selection of a row
    pub fn click(&mut self, index: usize) -> ListEvent {
        if !self.is_open() {
            return ListEvent::Ignored;
        }
        self.select(index)
    }

    /// Pointer press outside both the input and the list
    pub fn click_outside(&mut self) -> ListEvent {
        if !self.is_open() {
            return ListEvent::Ignored;
        }
        self.state = ListState::Closed;
        self.highlighted = None;
        ListEvent::Dismissed
    }

    /// Focus returning to the input reopens a list closed by an outside click
    pub fn focus(&mut self) {
        if !self.suggestions.is_empty() {
            self.state = ListState::Open;
        }
    }

    fn select(&mut self, index: usize) -> ListEvent {
        let Some(suggestion) = self.suggestions.get(index) else {
            return ListEvent::Ignored;
        };

        if let Some(message) = suggestion.rejection_reason() {
            debug!("Rejected suggestion {:?}: {}", suggestion.label, message);
            self.error = Some(message.clone());
            return ListEvent::Rejected(message);
        }

        let chosen = suggestion.clone();
        self.error = None;
        self.dismiss();
        ListEvent::Selected(chosen)
    }

    fn dismiss(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
        self.state = ListState::Closed;
    }
}
