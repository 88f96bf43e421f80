pub mod memory;
pub mod state;
pub mod store;

pub use memory::MemoryStore;
pub use state::AppState;
pub use store::{DateRange, Query, SortOrder, Store, StoreError};
