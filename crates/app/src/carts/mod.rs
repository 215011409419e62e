//! Carts

pub mod errors;
pub mod models;
pub mod session;
pub mod store;

pub use errors::{CartSessionError, CartStoreError, InvalidQuantity};
pub use session::{CART_ID_KEY, CartSession};
pub use store::*;
