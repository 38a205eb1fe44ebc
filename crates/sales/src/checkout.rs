//! Counter sale: seller sells one unit of a product to a customer.

use chrono::{DateTime, Utc};

use ventapos_catalog::{Product, ProductCommand, RecordSale};
use ventapos_core::{DomainError, DomainResult};
use ventapos_events::{commit, Journal};
use ventapos_parties::{
    AccrueCommission, Customer, CustomerCommand, Deposit, RecordPurchase, Seller, SellerCommand,
};

use crate::outcome::{DeclineReason, SaleOutcome, SaleReceipt};

/// Seller commission per sale: 0.5% of the net price.
pub const COMMISSION_BPS: i64 = 50;

/// Execute a sale.
///
/// The order of operations is contractual: balance check, then stock
/// decrement, then commission accrual, then balance debit. A stock failure
/// after a passed balance check therefore leaves the balance untouched.
/// `OutOfStock` never escapes this function; it comes back as a declined
/// outcome.
pub fn execute_sale(
    seller: &mut Seller,
    customer: &mut Customer,
    product: &mut Product,
    journal: &mut Journal,
    occurred_at: DateTime<Utc>,
) -> DomainResult<SaleOutcome> {
    let net_price = product.net_price();

    if customer.balance() < net_price {
        tracing::info!(
            customer = %customer.id_typed(),
            product = %product.sku(),
            "sale declined: insufficient balance"
        );
        return Ok(SaleOutcome::Declined(DeclineReason::InsufficientBalance {
            required: net_price,
            available: customer.balance(),
        }));
    }

    let sale = ProductCommand::RecordSale(RecordSale {
        product_id: product.id_typed(),
        occurred_at,
    });
    match commit(product, &sale, journal) {
        Ok(_) => {}
        Err(DomainError::OutOfStock(name)) => {
            tracing::info!(product = %product.sku(), "sale declined: out of stock");
            return Ok(SaleOutcome::Declined(DeclineReason::OutOfStock {
                product: name,
            }));
        }
        Err(other) => return Err(other),
    }

    let commission = net_price.scale_bps(COMMISSION_BPS);
    commit(
        seller,
        &SellerCommand::AccrueCommission(AccrueCommission {
            seller_id: seller.id_typed(),
            amount: commission,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        customer,
        &CustomerCommand::Deposit(Deposit {
            customer_id: customer.id_typed(),
            amount: -net_price,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        customer,
        &CustomerCommand::RecordPurchase(RecordPurchase {
            customer_id: customer.id_typed(),
            product_id: product.id_typed(),
            net_price,
            occurred_at,
        }),
        journal,
    )?;

    tracing::info!(
        seller = %seller.id_typed(),
        customer = %customer.id_typed(),
        product = %product.sku(),
        price = %net_price,
        "sale completed"
    );

    Ok(SaleOutcome::Completed(SaleReceipt {
        product_id: product.id_typed(),
        net_price,
        commission,
    }))
}
