//! Typed client for the commerce platform's REST API.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::{CommerceClient, CommerceSettings};
pub use error::CommerceError;
pub use types::{
    Buyer, LineItem, LineItemTaxCalculation, ListMeta, ListPage, Order, OrderCalculateResponse,
    OrderCalculateResponseXp, OrderDirection, OrderTaxCalculation, OrderWorksheet, Supplier,
};
