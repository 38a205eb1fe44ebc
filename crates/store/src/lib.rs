//! Application state and the persistence contract.
//!
//! The core performs no file or network IO. An external layer hands in plain
//! records at startup ([`records::Snapshot`]), the [`state::AppState`] owns
//! every aggregate from then on, and updated records (plus the event journal)
//! come back out for re-serialization.

pub mod records;
pub mod state;

pub use records::{CustomerRecord, ProductRecord, SellerRecord, Snapshot, SupplierRecord};
pub use state::AppState;
