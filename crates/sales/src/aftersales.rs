//! Exchanges and returns.

use chrono::{DateTime, Utc};

use ventapos_catalog::{AdjustStock, Product, ProductCommand};
use ventapos_core::{DomainError, DomainResult};
use ventapos_events::{commit, Journal};
use ventapos_parties::{Customer, CustomerCommand, Deposit};

use crate::outcome::{DeclineReason, ExchangeOutcome, ReturnOutcome};

/// Swap a held product (`outgoing`) for another (`incoming`).
///
/// The customer pays the signed price difference. Stock accounting follows
/// the till convention: the incoming unit goes back on the shelf, the
/// outgoing unit leaves it. The outgoing shelf must not be empty — stock can
/// never go negative.
pub fn exchange_product(
    customer: &mut Customer,
    incoming: &mut Product,
    outgoing: &mut Product,
    journal: &mut Journal,
    occurred_at: DateTime<Utc>,
) -> DomainResult<ExchangeOutcome> {
    let diff = outgoing.net_price() - incoming.net_price();

    if customer.balance() < diff {
        tracing::info!(
            customer = %customer.id_typed(),
            "exchange declined: insufficient balance"
        );
        return Ok(ExchangeOutcome::Declined(
            DeclineReason::InsufficientBalance {
                required: diff,
                available: customer.balance(),
            },
        ));
    }

    if outgoing.stock() == 0 {
        return Err(DomainError::out_of_stock(outgoing.name().to_string()));
    }

    commit(
        customer,
        &CustomerCommand::Deposit(Deposit {
            customer_id: customer.id_typed(),
            amount: -diff,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        incoming,
        &ProductCommand::AdjustStock(AdjustStock {
            product_id: incoming.id_typed(),
            delta: 1,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        outgoing,
        &ProductCommand::AdjustStock(AdjustStock {
            product_id: outgoing.id_typed(),
            delta: -1,
            occurred_at,
        }),
        journal,
    )?;

    tracing::info!(
        customer = %customer.id_typed(),
        incoming = %incoming.sku(),
        outgoing = %outgoing.sku(),
        charged = %diff,
        "products exchanged"
    );

    Ok(ExchangeOutcome::Exchanged { charged: diff })
}

/// Take back a sold product.
///
/// Only items in good condition are accepted; the customer is refunded the
/// net price and the unit returns to stock. Bad-condition items are rejected
/// outright, with no state change.
pub fn return_product(
    customer: &mut Customer,
    product: &mut Product,
    good_condition: bool,
    journal: &mut Journal,
    occurred_at: DateTime<Utc>,
) -> DomainResult<ReturnOutcome> {
    if !good_condition {
        tracing::info!(
            customer = %customer.id_typed(),
            product = %product.sku(),
            "return rejected: item in bad condition"
        );
        return Ok(ReturnOutcome::Rejected);
    }

    let refund = product.net_price();

    commit(
        product,
        &ProductCommand::AdjustStock(AdjustStock {
            product_id: product.id_typed(),
            delta: 1,
            occurred_at,
        }),
        journal,
    )?;

    commit(
        customer,
        &CustomerCommand::Deposit(Deposit {
            customer_id: customer.id_typed(),
            amount: refund,
            occurred_at,
        }),
        journal,
    )?;

    tracing::info!(
        customer = %customer.id_typed(),
        product = %product.sku(),
        refund = %refund,
        "return accepted"
    );

    Ok(ReturnOutcome::Accepted { refund })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{customer_with_balance, product_with_stock};
    use ventapos_core::Money;

    #[test]
    fn exchange_charges_the_difference_and_moves_stock() {
        let mut customer = customer_with_balance(Money::from_major(1_000));
        let (mut incoming, _) = product_with_stock(3, Money::from_major(2_000));
        let (mut outgoing, _) = product_with_stock(3, Money::from_major(2_500));
        let mut journal = Journal::new();

        let outcome = exchange_product(
            &mut customer,
            &mut incoming,
            &mut outgoing,
            &mut journal,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            outcome,
            ExchangeOutcome::Exchanged {
                charged: Money::from_major(500)
            }
        );
        assert_eq!(customer.balance(), Money::from_major(500));
        assert_eq!(incoming.stock(), 4);
        assert_eq!(outgoing.stock(), 2);
    }

    #[test]
    fn exchange_toward_a_cheaper_product_credits_the_customer() {
        let mut customer = customer_with_balance(Money::ZERO);
        let (mut incoming, _) = product_with_stock(1, Money::from_major(3_000));
        let (mut outgoing, _) = product_with_stock(1, Money::from_major(2_000));
        let mut journal = Journal::new();

        // diff is negative; the balance check passes and the debit is a credit.
        let outcome = exchange_product(
            &mut customer,
            &mut incoming,
            &mut outgoing,
            &mut journal,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            outcome,
            ExchangeOutcome::Exchanged {
                charged: Money::from_major(-1_000)
            }
        );
        assert_eq!(customer.balance(), Money::from_major(1_000));
    }

    #[test]
    fn exchange_with_short_balance_is_declined_untouched() {
        let mut customer = customer_with_balance(Money::from_major(100));
        let (mut incoming, _) = product_with_stock(3, Money::from_major(1_000));
        let (mut outgoing, _) = product_with_stock(3, Money::from_major(2_000));
        let mut journal = Journal::new();

        let outcome = exchange_product(
            &mut customer,
            &mut incoming,
            &mut outgoing,
            &mut journal,
            Utc::now(),
        )
        .unwrap();

        assert!(matches!(
            outcome,
            ExchangeOutcome::Declined(DeclineReason::InsufficientBalance { .. })
        ));
        assert_eq!(customer.balance(), Money::from_major(100));
        assert_eq!(incoming.stock(), 3);
        assert_eq!(outgoing.stock(), 3);
        assert!(journal.is_empty());
    }

    #[test]
    fn exchange_of_an_empty_outgoing_shelf_is_a_hard_error() {
        let mut customer = customer_with_balance(Money::from_major(10_000));
        let (mut incoming, _) = product_with_stock(3, Money::from_major(1_000));
        let (mut outgoing, _) = product_with_stock(0, Money::from_major(2_000));
        let mut journal = Journal::new();

        let err = exchange_product(
            &mut customer,
            &mut incoming,
            &mut outgoing,
            &mut journal,
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::OutOfStock(_)));
        assert_eq!(customer.balance(), Money::from_major(10_000));
        assert_eq!(incoming.stock(), 3);
        assert!(journal.is_empty());
    }

    #[test]
    fn good_condition_return_refunds_and_restocks() {
        let mut customer = customer_with_balance(Money::ZERO);
        let (mut product, _) = product_with_stock(2, Money::from_major(1_500));
        let mut journal = Journal::new();

        let outcome = return_product(&mut customer, &mut product, true, &mut journal, Utc::now())
            .unwrap();

        assert_eq!(
            outcome,
            ReturnOutcome::Accepted {
                refund: Money::from_major(1_500)
            }
        );
        assert_eq!(customer.balance(), Money::from_major(1_500));
        assert_eq!(product.stock(), 3);
    }

    #[test]
    fn bad_condition_return_is_rejected_with_no_state_change() {
        let mut customer = customer_with_balance(Money::ZERO);
        let (mut product, _) = product_with_stock(2, Money::from_major(1_500));
        let mut journal = Journal::new();

        let outcome = return_product(&mut customer, &mut product, false, &mut journal, Utc::now())
            .unwrap();

        assert_eq!(outcome, ReturnOutcome::Rejected);
        assert_eq!(customer.balance(), Money::ZERO);
        assert_eq!(product.stock(), 2);
        assert!(journal.is_empty());
    }
}
