mod collection;
mod data_store;

pub use collection::LoadState;
pub use data_store::{DataStore, Resource};
