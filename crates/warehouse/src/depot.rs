use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{Aggregate, AggregateRoot, DomainError, ProductId, WarehouseId};
use ventapos_events::Event;

/// Aggregate root: Warehouse.
///
/// Central stock levels per product, kept apart from the branch-side stock on
/// the product aggregates. Levels never go negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    levels: BTreeMap<ProductId, i64>,
    version: u64,
    created: bool,
}

impl Warehouse {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: WarehouseId) -> Self {
        Self {
            id,
            name: String::new(),
            levels: BTreeMap::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Central stock for a product; products never received count as zero.
    pub fn level(&self, product_id: ProductId) -> i64 {
        self.levels.get(&product_id).copied().unwrap_or(0)
    }
}

impl AggregateRoot for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenWarehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWarehouse {
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveCentralStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveCentralStock {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: WithdrawBatch (towards a branch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawBatch {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarehouseCommand {
    OpenWarehouse(OpenWarehouse),
    ReceiveCentralStock(ReceiveCentralStock),
    WithdrawBatch(WithdrawBatch),
}

/// Event: WarehouseOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseOpened {
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CentralStockReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralStockReceived {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BatchWithdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWithdrawn {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarehouseEvent {
    WarehouseOpened(WarehouseOpened),
    CentralStockReceived(CentralStockReceived),
    BatchWithdrawn(BatchWithdrawn),
}

impl Event for WarehouseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WarehouseEvent::WarehouseOpened(_) => "warehouse.depot.opened",
            WarehouseEvent::CentralStockReceived(_) => "warehouse.depot.central_stock_received",
            WarehouseEvent::BatchWithdrawn(_) => "warehouse.depot.batch_withdrawn",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WarehouseEvent::WarehouseOpened(e) => e.occurred_at,
            WarehouseEvent::CentralStockReceived(e) => e.occurred_at,
            WarehouseEvent::BatchWithdrawn(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Warehouse {
    type Command = WarehouseCommand;
    type Event = WarehouseEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            WarehouseEvent::WarehouseOpened(e) => {
                self.id = e.warehouse_id;
                self.name = e.name.clone();
                self.created = true;
            }
            WarehouseEvent::CentralStockReceived(e) => {
                *self.levels.entry(e.product_id).or_insert(0) += e.quantity;
            }
            WarehouseEvent::BatchWithdrawn(e) => {
                *self.levels.entry(e.product_id).or_insert(0) -= e.quantity;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            WarehouseCommand::OpenWarehouse(cmd) => self.handle_open(cmd),
            WarehouseCommand::ReceiveCentralStock(cmd) => self.handle_receive(cmd),
            WarehouseCommand::WithdrawBatch(cmd) => self.handle_withdraw(cmd),
        }
    }
}

impl Warehouse {
    fn ensure_warehouse_id(&self, warehouse_id: WarehouseId) -> Result<(), DomainError> {
        if self.id != warehouse_id {
            return Err(DomainError::invariant("warehouse_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenWarehouse) -> Result<Vec<WarehouseEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("warehouse already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![WarehouseEvent::WarehouseOpened(WarehouseOpened {
            warehouse_id: cmd.warehouse_id,
            name: cmd.name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receive(
        &self,
        cmd: &ReceiveCentralStock,
    ) -> Result<Vec<WarehouseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_warehouse_id(cmd.warehouse_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        Ok(vec![WarehouseEvent::CentralStockReceived(
            CentralStockReceived {
                warehouse_id: cmd.warehouse_id,
                product_id: cmd.product_id,
                quantity: cmd.quantity,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_withdraw(&self, cmd: &WithdrawBatch) -> Result<Vec<WarehouseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_warehouse_id(cmd.warehouse_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        if self.level(cmd.product_id) < cmd.quantity {
            return Err(DomainError::invariant(
                "central stock cannot go negative",
            ));
        }

        Ok(vec![WarehouseEvent::BatchWithdrawn(BatchWithdrawn {
            warehouse_id: cmd.warehouse_id,
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_warehouse() -> Warehouse {
        let warehouse_id = WarehouseId::new();
        let mut warehouse = Warehouse::empty(warehouse_id);
        let cmd = OpenWarehouse {
            warehouse_id,
            name: "Central Depot".to_string(),
            occurred_at: Utc::now(),
        };
        let events = warehouse
            .handle(&WarehouseCommand::OpenWarehouse(cmd))
            .unwrap();
        warehouse.apply(&events[0]);
        warehouse
    }

    fn receive(warehouse: &mut Warehouse, product_id: ProductId, quantity: i64) {
        let cmd = ReceiveCentralStock {
            warehouse_id: warehouse.id_typed(),
            product_id,
            quantity,
            occurred_at: Utc::now(),
        };
        let events = warehouse
            .handle(&WarehouseCommand::ReceiveCentralStock(cmd))
            .unwrap();
        warehouse.apply(&events[0]);
    }

    #[test]
    fn unknown_products_have_level_zero() {
        let warehouse = open_warehouse();
        assert_eq!(warehouse.level(ProductId::new()), 0);
    }

    #[test]
    fn receive_and_withdraw_move_the_level() {
        let mut warehouse = open_warehouse();
        let product_id = ProductId::new();
        receive(&mut warehouse, product_id, 400);

        let cmd = WithdrawBatch {
            warehouse_id: warehouse.id_typed(),
            product_id,
            quantity: 300,
            occurred_at: Utc::now(),
        };
        let events = warehouse
            .handle(&WarehouseCommand::WithdrawBatch(cmd))
            .unwrap();
        warehouse.apply(&events[0]);

        assert_eq!(warehouse.level(product_id), 100);
    }

    #[test]
    fn withdrawing_more_than_the_level_is_rejected() {
        let mut warehouse = open_warehouse();
        let product_id = ProductId::new();
        receive(&mut warehouse, product_id, 200);

        let cmd = WithdrawBatch {
            warehouse_id: warehouse.id_typed(),
            product_id,
            quantity: 300,
            occurred_at: Utc::now(),
        };
        let err = warehouse
            .handle(&WarehouseCommand::WithdrawBatch(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(warehouse.level(product_id), 200);
    }
}
