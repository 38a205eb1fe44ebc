//! Sales domain module: transactions that span more than one aggregate.
//!
//! Sales, exchanges, returns and commission redemptions each touch a product
//! plus one or two parties. The aggregates stay self-contained; this crate
//! orchestrates them — every mutation goes through `handle` → `apply`, with
//! each applied event journaled. Declined operations are values
//! ([`outcome`]), never process errors.

pub mod aftersales;
pub mod checkout;
pub mod outcome;
pub mod redemption;

#[cfg(test)]
pub(crate) mod testing;

pub use aftersales::{exchange_product, return_product};
pub use checkout::{execute_sale, COMMISSION_BPS};
pub use outcome::{
    DeclineReason, ExchangeOutcome, RedemptionOutcome, ReturnOutcome, SaleOutcome, SaleReceipt,
};
pub use redemption::{redeem_commission, REDEMPTION_COST_BPS};
