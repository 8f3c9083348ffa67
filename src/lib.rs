//! Storefront and admin backend for a homeware shop: catalogue browsing,
//! carts, wishlists, orders and image hosting behind a token-gated API.

pub mod api;
pub mod catalog;
pub mod entities;
pub mod middleware;
