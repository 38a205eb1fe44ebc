//! Warehouse domain module (event-sourced).
//!
//! The branch carries the shelf stock (on the product aggregates); the
//! warehouse tracks central stock per product. The restock pass moves fixed
//! batches from the central side to the branch side — the two quantities are
//! deliberately separate fields.

pub mod branch;
pub mod depot;
pub mod restock;

pub use branch::{Branch, BranchCommand, BranchEvent, ListProduct, OpenBranch};
pub use depot::{
    OpenWarehouse, ReceiveCentralStock, Warehouse, WarehouseCommand, WarehouseEvent, WithdrawBatch,
};
pub use restock::{
    run_pass, RestockEntry, RestockOutcome, RestockReport, RESTOCK_BATCH, RESTOCK_THRESHOLD,
};
