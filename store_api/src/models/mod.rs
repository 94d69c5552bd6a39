// store_api/src/models/mod.rs

//! Contains data structures representing database entities and request payloads.

pub mod cart;
pub mod goods;
pub mod order;

// Re-export the model structs for convenient access
pub use cart::{CartGoodsAdd, CartGoodsUpdate, CartLine};
pub use goods::{Goods, GoodsUpdate};
pub use order::{Order, OrderCreate, OrderUpdate, OrderUpdatePayload};
