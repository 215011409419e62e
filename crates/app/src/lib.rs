//! Storefront client domain: cart session, auth, catalog and orders.

pub mod api;
pub mod auth;
pub mod carts;
pub mod checkout;
pub mod context;
pub mod ids;
pub mod orders;
pub mod products;
pub mod storage;

#[cfg(test)]
mod test;
