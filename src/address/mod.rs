pub mod ban;
pub mod debounce;
pub mod field;
pub mod suggestions;
pub mod traits;
pub mod types;

pub use ban::BanClient;
pub use debounce::DebouncedSearch;
pub use field::AddressField;
pub use suggestions::{ListEvent, ListKey, ListState, SuggestionList};
pub use traits::AddressSearch;
pub use types::{SearchOutcome, SearchParams, MIN_QUERY_LEN};
