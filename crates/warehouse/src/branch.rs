use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{Aggregate, AggregateRoot, BranchId, DomainError, ProductId};
use ventapos_events::Event;

/// Aggregate root: Branch.
///
/// A branch holds the ordered list of products it stocks; the quantities
/// themselves live on the product aggregates. Restock passes walk this list
/// in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    id: BranchId,
    name: String,
    product_ids: Vec<ProductId>,
    version: u64,
    created: bool,
}

impl Branch {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: BranchId) -> Self {
        Self {
            id,
            name: String::new(),
            product_ids: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> BranchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    pub fn carries(&self, product_id: ProductId) -> bool {
        self.product_ids.contains(&product_id)
    }
}

impl AggregateRoot for Branch {
    type Id = BranchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenBranch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBranch {
    pub branch_id: BranchId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ListProduct (start carrying a product at this branch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListProduct {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchCommand {
    OpenBranch(OpenBranch),
    ListProduct(ListProduct),
}

/// Event: BranchOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchOpened {
    pub branch_id: BranchId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductListed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListed {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchEvent {
    BranchOpened(BranchOpened),
    ProductListed(ProductListed),
}

impl Event for BranchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BranchEvent::BranchOpened(_) => "warehouse.branch.opened",
            BranchEvent::ProductListed(_) => "warehouse.branch.product_listed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BranchEvent::BranchOpened(e) => e.occurred_at,
            BranchEvent::ProductListed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Branch {
    type Command = BranchCommand;
    type Event = BranchEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BranchEvent::BranchOpened(e) => {
                self.id = e.branch_id;
                self.name = e.name.clone();
                self.created = true;
            }
            BranchEvent::ProductListed(e) => {
                self.product_ids.push(e.product_id);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BranchCommand::OpenBranch(cmd) => self.handle_open(cmd),
            BranchCommand::ListProduct(cmd) => self.handle_list(cmd),
        }
    }
}

impl Branch {
    fn ensure_branch_id(&self, branch_id: BranchId) -> Result<(), DomainError> {
        if self.id != branch_id {
            return Err(DomainError::invariant("branch_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenBranch) -> Result<Vec<BranchEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("branch already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![BranchEvent::BranchOpened(BranchOpened {
            branch_id: cmd.branch_id,
            name: cmd.name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_list(&self, cmd: &ListProduct) -> Result<Vec<BranchEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_branch_id(cmd.branch_id)?;

        if self.carries(cmd.product_id) {
            return Err(DomainError::conflict(
                "product is already listed at this branch",
            ));
        }

        Ok(vec![BranchEvent::ProductListed(ProductListed {
            branch_id: cmd.branch_id,
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
