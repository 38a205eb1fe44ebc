//! Catalog domain module (event-sourced).
//!
//! Business rules for products and their stock, implemented purely as
//! deterministic domain logic (no IO, no storage).

pub mod product;

pub use product::{
    AdjustStock, ArchiveProduct, Pricing, Product, ProductCommand, ProductEvent, ProductStatus,
    ReceiveStock, RecordSale, RegisterProduct,
};
