pub mod area;
pub mod error;
pub mod memory;
pub mod store;

pub use area::{AreaName, StorageArea, StorageChange, ValueChange};
pub use error::{Result, StoreError};
pub use memory::MemoryArea;
pub use store::{KeyValueStore, StoreConfig};
