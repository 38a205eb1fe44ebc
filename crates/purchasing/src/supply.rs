//! Inbound stock deliveries from suppliers.

use chrono::{DateTime, Utc};

use ventapos_catalog::{Product, ProductCommand, ReceiveStock};
use ventapos_core::{DomainError, DomainResult, SupplierId};
use ventapos_events::{commit, Journal};

/// Result of a supply delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplyOutcome {
    /// Stock landed on the shelf; `stock` is the product's new level.
    Received { stock: i64 },
    /// The product is not supplied by this supplier; nothing changed.
    WrongSupplier { product: String },
}

/// Deliver stock from a supplier to one of its products.
///
/// The product aggregate checks the supplier binding; a delivery from anyone
/// but the declared supplier comes back as a declined outcome with the stock
/// untouched.
pub fn receive_from_supplier(
    product: &mut Product,
    supplier_id: SupplierId,
    quantity: i64,
    journal: &mut Journal,
    occurred_at: DateTime<Utc>,
) -> DomainResult<SupplyOutcome> {
    let delivery = ProductCommand::ReceiveStock(ReceiveStock {
        product_id: product.id_typed(),
        supplier_id,
        quantity,
        occurred_at,
    });

    match commit(product, &delivery, journal) {
        Ok(_) => {
            tracing::info!(
                product = %product.sku(),
                supplier = %supplier_id,
                quantity,
                stock = product.stock(),
                "supplier delivery received"
            );
            Ok(SupplyOutcome::Received {
                stock: product.stock(),
            })
        }
        Err(DomainError::WrongSupplier(name)) => {
            tracing::warn!(
                product = %product.sku(),
                supplier = %supplier_id,
                "supply rejected: wrong supplier"
            );
            Ok(SupplyOutcome::WrongSupplier { product: name })
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventapos_catalog::{Pricing, RegisterProduct};
    use ventapos_core::{Aggregate, Money, ProductId};

    fn supplied_product(stock: i64) -> (Product, SupplierId) {
        let product_id = ProductId::new();
        let supplier_id = SupplierId::new();
        let mut product = Product::empty(product_id);
        let cmd = ProductCommand::RegisterProduct(RegisterProduct {
            product_id,
            sku: "SKU-001".to_string(),
            name: "Lamp".to_string(),
            category: "Lighting".to_string(),
            supplier_id,
            initial_stock: stock,
            pricing: Pricing::net(Money::from_major(200)),
            occurred_at: Utc::now(),
        });
        let events = product.handle(&cmd).unwrap();
        product.apply(&events[0]);
        (product, supplier_id)
    }

    #[test]
    fn declared_supplier_adds_stock() {
        let (mut product, supplier_id) = supplied_product(5);
        let mut journal = Journal::new();

        let outcome =
            receive_from_supplier(&mut product, supplier_id, 30, &mut journal, Utc::now())
                .unwrap();

        assert_eq!(outcome, SupplyOutcome::Received { stock: 35 });
        assert_eq!(product.stock(), 35);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn other_suppliers_are_turned_away() {
        let (mut product, _) = supplied_product(5);
        let mut journal = Journal::new();

        let outcome =
            receive_from_supplier(&mut product, SupplierId::new(), 30, &mut journal, Utc::now())
                .unwrap();

        assert_eq!(
            outcome,
            SupplyOutcome::WrongSupplier {
                product: "Lamp".to_string()
            }
        );
        assert_eq!(product.stock(), 5);
        assert!(journal.is_empty());
    }

    #[test]
    fn non_positive_quantities_are_hard_errors() {
        let (mut product, supplier_id) = supplied_product(5);
        let mut journal = Journal::new();

        let err = receive_from_supplier(&mut product, supplier_id, 0, &mut journal, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
