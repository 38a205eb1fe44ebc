//! Commission-for-inventory redemption between two sellers.

use chrono::{DateTime, Utc};

use ventapos_catalog::{AdjustStock, Product, ProductCommand};
use ventapos_core::{DomainError, DomainResult};
use ventapos_events::{commit, Journal};
use ventapos_parties::{RedeemCommission, Seller, SellerCommand};

use crate::outcome::{DeclineReason, RedemptionOutcome};

/// Redemption cost: 60% of the product's net price.
pub const REDEMPTION_COST_BPS: i64 = 6_000;

/// Two sellers jointly redeem commission for one discounted unit.
///
/// The contract is asymmetric: only `other`'s commission is checked for
/// sufficiency, yet the cost is debited from both sellers — the initiator's
/// commission may go negative. The redeemed unit leaves stock. Taking both
/// sellers as distinct `&mut Seller` is the role check: nothing else can be
/// passed in, and a seller cannot redeem against themself.
pub fn redeem_commission(
    seller: &mut Seller,
    other: &mut Seller,
    product: &mut Product,
    journal: &mut Journal,
    occurred_at: DateTime<Utc>,
) -> DomainResult<RedemptionOutcome> {
    let cost = product.net_price().scale_bps(REDEMPTION_COST_BPS);

    if other.commission() < cost {
        tracing::info!(
            seller = %seller.id_typed(),
            other = %other.id_typed(),
            "redemption declined: insufficient commission"
        );
        return Ok(RedemptionOutcome::Declined(
            DeclineReason::InsufficientCommission {
                required: cost,
                available: other.commission(),
            },
        ));
    }

    if product.stock() == 0 {
        return Err(DomainError::out_of_stock(product.name().to_string()));
    }

    commit(
        other,
        &SellerCommand::RedeemCommission(RedeemCommission {
            seller_id: other.id_typed(),
            amount: cost,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        seller,
        &SellerCommand::RedeemCommission(RedeemCommission {
            seller_id: seller.id_typed(),
            amount: cost,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        product,
        &ProductCommand::AdjustStock(AdjustStock {
            product_id: product.id_typed(),
            delta: -1,
            occurred_at,
        }),
        journal,
    )?;

    tracing::info!(
        seller = %seller.id_typed(),
        other = %other.id_typed(),
        product = %product.sku(),
        cost = %cost,
        "commission redeemed"
    );

    Ok(RedemptionOutcome::Redeemed { cost })
}
