//! Parties domain module (event-sourced).
//!
//! Customers, sellers and suppliers. All three embed a shared [`PersonInfo`]
//! value object where a person is involved — composition, no base-class
//! hierarchy.

pub mod customer;
pub mod person;
pub mod seller;
pub mod supplier;

pub use customer::{
    AddToCart, ClearCart, Customer, CustomerCommand, CustomerEvent, Deposit, PurchaseLine,
    RecordPurchase, RegisterCustomer,
};
pub use person::PersonInfo;
pub use seller::{
    AccrueCommission, RedeemCommission, RegisterSeller, Seller, SellerCommand, SellerEvent,
};
pub use supplier::{PersonKind, RegisterSupplier, Supplier, SupplierCommand, SupplierEvent};
