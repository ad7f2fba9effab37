pub mod search;

pub use search::{SearchResult, Searcher, best_action};
