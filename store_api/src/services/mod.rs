// store_api/src/services/mod.rs

pub mod store;

pub use store::StoreService;
