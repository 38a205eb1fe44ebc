use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Money, ProductId, PurchaseOrderId,
};
use ventapos_catalog::Product;
use ventapos_events::Event;

/// Flat surcharge added when dispatch is requested.
pub const DISPATCH_FEE: Money = Money::from_major(5_000);

/// Aggregate root: PurchaseOrder.
///
/// Holds the product reference and the dispatch flag; the total is derived,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    product_id: Option<ProductId>,
    dispatch: bool,
    version: u64,
    created: bool,
}

impl PurchaseOrder {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: PurchaseOrderId) -> Self {
        Self {
            id,
            product_id: None,
            dispatch: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn dispatch(&self) -> bool {
        self.dispatch
    }

    /// Order total: the product's net price, plus the flat dispatch fee when
    /// dispatch was requested. Pure computation against the current price.
    pub fn total(&self, product: &Product) -> DomainResult<Money> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.product_id != Some(product.id_typed()) {
            return Err(DomainError::invariant(
                "purchase order references a different product",
            ));
        }

        let net_price = product.net_price();
        Ok(if self.dispatch {
            net_price + DISPATCH_FEE
        } else {
            net_price
        })
    }
}

impl AggregateRoot for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenPurchaseOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPurchaseOrder {
    pub order_id: PurchaseOrderId,
    pub product_id: ProductId,
    pub dispatch: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderCommand {
    OpenPurchaseOrder(OpenPurchaseOrder),
}

/// Event: PurchaseOrderOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderOpened {
    pub order_id: PurchaseOrderId,
    pub product_id: ProductId,
    pub dispatch: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderEvent {
    PurchaseOrderOpened(PurchaseOrderOpened),
}

impl Event for PurchaseOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseOrderEvent::PurchaseOrderOpened(_) => "purchasing.order.opened",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PurchaseOrderEvent::PurchaseOrderOpened(e) => e.occurred_at,
        }
    }
}

impl Aggregate for PurchaseOrder {
    type Command = PurchaseOrderCommand;
    type Event = PurchaseOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PurchaseOrderEvent::PurchaseOrderOpened(e) => {
                self.id = e.order_id;
                self.product_id = Some(e.product_id);
                self.dispatch = e.dispatch;
                self.created = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PurchaseOrderCommand::OpenPurchaseOrder(cmd) => self.handle_open(cmd),
        }
    }
}

impl PurchaseOrder {
    fn handle_open(&self, cmd: &OpenPurchaseOrder) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("purchase order already exists"));
        }

        Ok(vec![PurchaseOrderEvent::PurchaseOrderOpened(
            PurchaseOrderOpened {
                order_id: cmd.order_id,
                product_id: cmd.product_id,
                dispatch: cmd.dispatch,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}
