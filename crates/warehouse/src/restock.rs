//! Branch restocking from central stock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use ventapos_catalog::{AdjustStock, Product, ProductCommand};
use ventapos_core::{DomainError, DomainResult, ProductId};
use ventapos_events::{commit, Journal};

use crate::branch::Branch;
use crate::depot::{Warehouse, WarehouseCommand, WithdrawBatch};

/// Branch stock below this needs restocking.
pub const RESTOCK_THRESHOLD: i64 = 50;

/// Units moved per restock, central to branch.
pub const RESTOCK_BATCH: i64 = 300;

/// What happened to one product during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestockOutcome {
    /// Branch stock at or above the threshold; no action.
    Sufficient,
    /// A batch moved from central to branch stock.
    Restocked {
        branch_stock: i64,
        central_stock: i64,
    },
    /// Could not restock: central stock below one batch. The product stays
    /// short until a later pass finds enough.
    SourceExhausted { central_stock: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestockEntry {
    pub product_id: ProductId,
    pub outcome: RestockOutcome,
}

/// Per-product outcomes of one pass, in branch listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockReport {
    pub entries: Vec<RestockEntry>,
}

impl RestockReport {
    pub fn restocked(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RestockOutcome::Restocked { .. }))
            .count()
    }

    pub fn exhausted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RestockOutcome::SourceExhausted { .. }))
            .count()
    }
}

/// Evaluate every product the branch carries, in listing order.
///
/// Each product is decided independently — no cross-product prioritization.
/// Below-threshold products get one batch if the central side holds at least
/// one full batch; otherwise nothing moves and the shortfall is reported.
pub fn run_pass(
    warehouse: &mut Warehouse,
    branch: &Branch,
    products: &mut HashMap<ProductId, Product>,
    journal: &mut Journal,
    occurred_at: DateTime<Utc>,
) -> DomainResult<RestockReport> {
    let mut entries = Vec::with_capacity(branch.product_ids().len());

    for &product_id in branch.product_ids() {
        let product = products.get_mut(&product_id).ok_or(DomainError::NotFound)?;

        let outcome = if product.stock() >= RESTOCK_THRESHOLD {
            RestockOutcome::Sufficient
        } else if warehouse.level(product_id) >= RESTOCK_BATCH {
            commit(
                warehouse,
                &WarehouseCommand::WithdrawBatch(WithdrawBatch {
                    warehouse_id: warehouse.id_typed(),
                    product_id,
                    quantity: RESTOCK_BATCH,
                    occurred_at,
                }),
                journal,
            )?;
            commit(
                product,
                &ProductCommand::AdjustStock(AdjustStock {
                    product_id,
                    delta: RESTOCK_BATCH,
                    occurred_at,
                }),
                journal,
            )?;
            tracing::info!(
                branch = branch.name(),
                product = %product.sku(),
                branch_stock = product.stock(),
                "restocked one batch from central stock"
            );
            RestockOutcome::Restocked {
                branch_stock: product.stock(),
                central_stock: warehouse.level(product_id),
            }
        } else {
            tracing::warn!(
                branch = branch.name(),
                product = %product.sku(),
                central_stock = warehouse.level(product_id),
                "could not restock: central stock exhausted"
            );
            RestockOutcome::SourceExhausted {
                central_stock: warehouse.level(product_id),
            }
        };

        entries.push(RestockEntry {
            product_id,
            outcome,
        });
    }

    Ok(RestockReport { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventapos_catalog::{Pricing, RegisterProduct};
    use ventapos_core::{Aggregate, BranchId, Money, SupplierId, WarehouseId};
    use crate::branch::{BranchCommand, ListProduct, OpenBranch};
    use crate::depot::{OpenWarehouse, ReceiveCentralStock};

    struct Fixture {
        warehouse: Warehouse,
        branch: Branch,
        products: HashMap<ProductId, Product>,
        journal: Journal,
    }

    impl Fixture {
        fn new() -> Self {
            let warehouse_id = WarehouseId::new();
            let mut warehouse = Warehouse::empty(warehouse_id);
            let cmd = WarehouseCommand::OpenWarehouse(OpenWarehouse {
                warehouse_id,
                name: "Central Depot".to_string(),
                occurred_at: Utc::now(),
            });
            let events = warehouse.handle(&cmd).unwrap();
            warehouse.apply(&events[0]);

            let branch_id = BranchId::new();
            let mut branch = Branch::empty(branch_id);
            let cmd = BranchCommand::OpenBranch(OpenBranch {
                branch_id,
                name: "Main Branch".to_string(),
                occurred_at: Utc::now(),
            });
            let events = branch.handle(&cmd).unwrap();
            branch.apply(&events[0]);

            Self {
                warehouse,
                branch,
                products: HashMap::new(),
                journal: Journal::new(),
            }
        }

        fn add_product(&mut self, branch_stock: i64, central_stock: i64) -> ProductId {
            let product_id = ProductId::new();
            let mut product = Product::empty(product_id);
            let cmd = ProductCommand::RegisterProduct(RegisterProduct {
                product_id,
                sku: format!("SKU-{}", self.products.len() + 1),
                name: "Widget".to_string(),
                category: "General".to_string(),
                supplier_id: SupplierId::new(),
                initial_stock: branch_stock,
                pricing: Pricing::net(Money::from_major(100)),
                occurred_at: Utc::now(),
            });
            let events = product.handle(&cmd).unwrap();
            product.apply(&events[0]);
            self.products.insert(product_id, product);

            let cmd = BranchCommand::ListProduct(ListProduct {
                branch_id: self.branch.id_typed(),
                product_id,
                occurred_at: Utc::now(),
            });
            let events = self.branch.handle(&cmd).unwrap();
            self.branch.apply(&events[0]);

            if central_stock > 0 {
                let cmd = WarehouseCommand::ReceiveCentralStock(ReceiveCentralStock {
                    warehouse_id: self.warehouse.id_typed(),
                    product_id,
                    quantity: central_stock,
                    occurred_at: Utc::now(),
                });
                let events = self.warehouse.handle(&cmd).unwrap();
                self.warehouse.apply(&events[0]);
            }

            product_id
        }

        fn run(&mut self) -> RestockReport {
            run_pass(
                &mut self.warehouse,
                &self.branch,
                &mut self.products,
                &mut self.journal,
                Utc::now(),
            )
            .unwrap()
        }
    }

    #[test]
    fn short_branch_with_full_central_gets_one_batch() {
        let mut fx = Fixture::new();
        let product_id = fx.add_product(10, 400);

        let report = fx.run();

        assert_eq!(fx.products[&product_id].stock(), 310);
        assert_eq!(fx.warehouse.level(product_id), 100);
        assert_eq!(
            report.entries[0].outcome,
            RestockOutcome::Restocked {
                branch_stock: 310,
                central_stock: 100
            }
        );
    }

    #[test]
    fn short_branch_with_short_central_changes_nothing() {
        let mut fx = Fixture::new();
        let product_id = fx.add_product(10, 200);

        let report = fx.run();

        assert_eq!(fx.products[&product_id].stock(), 10);
        assert_eq!(fx.warehouse.level(product_id), 200);
        assert_eq!(
            report.entries[0].outcome,
            RestockOutcome::SourceExhausted { central_stock: 200 }
        );
        assert!(fx.journal.is_empty());
    }

    #[test]
    fn sufficient_branch_stock_is_left_alone() {
        let mut fx = Fixture::new();
        let product_id = fx.add_product(50, 400);

        let report = fx.run();

        assert_eq!(fx.products[&product_id].stock(), 50);
        assert_eq!(fx.warehouse.level(product_id), 400);
        assert_eq!(report.entries[0].outcome, RestockOutcome::Sufficient);
    }

    #[test]
    fn products_are_decided_independently_in_listing_order() {
        let mut fx = Fixture::new();
        let low_full = fx.add_product(0, 300);
        let low_dry = fx.add_product(49, 299);
        let high = fx.add_product(200, 0);

        let report = fx.run();

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[0].product_id, low_full);
        assert!(matches!(
            report.entries[0].outcome,
            RestockOutcome::Restocked { .. }
        ));
        assert_eq!(report.entries[1].product_id, low_dry);
        assert!(matches!(
            report.entries[1].outcome,
            RestockOutcome::SourceExhausted { .. }
        ));
        assert_eq!(report.entries[2].product_id, high);
        assert_eq!(report.entries[2].outcome, RestockOutcome::Sufficient);
        assert_eq!(report.restocked(), 1);
        assert_eq!(report.exhausted(), 1);
        assert_eq!(fx.products[&low_full].stock(), 300);
    }

    #[test]
    fn a_failed_product_recovers_on_a_later_pass() {
        let mut fx = Fixture::new();
        let product_id = fx.add_product(10, 200);

        let first = fx.run();
        assert_eq!(first.exhausted(), 1);

        // Central stock arrives between passes.
        let cmd = WarehouseCommand::ReceiveCentralStock(ReceiveCentralStock {
            warehouse_id: fx.warehouse.id_typed(),
            product_id,
            quantity: 150,
            occurred_at: Utc::now(),
        });
        let events = fx.warehouse.handle(&cmd).unwrap();
        fx.warehouse.apply(&events[0]);

        let second = fx.run();
        assert_eq!(second.restocked(), 1);
        assert_eq!(fx.products[&product_id].stock(), 310);
        assert_eq!(fx.warehouse.level(product_id), 50);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a pass conserves total stock per product and never
            /// drives either side negative.
            #[test]
            fn pass_conserves_stock(
                sides in proptest::collection::vec((0i64..400, 0i64..600), 1..8)
            ) {
                let mut fx = Fixture::new();
                let ids: Vec<ProductId> = sides
                    .iter()
                    .map(|(branch_stock, central_stock)| fx.add_product(*branch_stock, *central_stock))
                    .collect();

                fx.run();

                for (product_id, (branch_before, central_before)) in ids.iter().zip(&sides) {
                    let branch_after = fx.products[product_id].stock();
                    let central_after = fx.warehouse.level(*product_id);
                    prop_assert!(branch_after >= 0);
                    prop_assert!(central_after >= 0);
                    prop_assert_eq!(
                        branch_after + central_after,
                        branch_before + central_before
                    );
                }
            }
        }
    }
}
