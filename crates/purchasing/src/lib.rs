//! Purchasing domain module (event-sourced).
//!
//! Inbound stock from suppliers and customer purchase orders with the flat
//! dispatch surcharge.

pub mod order;
pub mod supply;

pub use order::{
    OpenPurchaseOrder, PurchaseOrder, PurchaseOrderCommand, PurchaseOrderEvent, DISPATCH_FEE,
};
pub use supply::{receive_from_supplier, SupplyOutcome};
