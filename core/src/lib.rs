pub mod core;
pub mod types;

pub use crate::core::error::PasteError;
pub use crate::core::store::error::StoreError;
pub use crate::core::store::{MemoryStore, Mutation, RecordStore, RedbStore};
pub use crate::core::{PasteCore, SweepOutcome};
