use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{
    Aggregate, AggregateRoot, DomainError, Money, ProductId, SupplierId, ValueObject,
};
use ventapos_events::Event;

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Archived,
}

/// Pricing data: net price plus flat rates in basis points.
///
/// The tax rate defaults to the 1.19 multiplier (11_900 bps). Discount is
/// carried for the persistence round-trip and display; no pricing engine sits
/// behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub net_price: Money,
    pub tax_rate_bps: u32,
    pub discount_bps: u32,
}

impl Pricing {
    pub const DEFAULT_TAX_RATE_BPS: u32 = 11_900;

    pub fn net(net_price: Money) -> Self {
        Self {
            net_price,
            ..Self::default()
        }
    }

    /// Net price with the tax multiplier applied.
    pub fn gross_price(&self) -> Money {
        self.net_price.scale_bps(self.tax_rate_bps as i64)
    }

    /// Net price minus the configured discount.
    pub fn discounted_net(&self) -> Money {
        self.net_price - self.net_price.scale_bps(self.discount_bps as i64)
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            net_price: Money::ZERO,
            tax_rate_bps: Self::DEFAULT_TAX_RATE_BPS,
            discount_bps: 0,
        }
    }
}

impl ValueObject for Pricing {}

/// Aggregate root: Product.
///
/// `stock` is the branch-side quantity; central warehouse levels are tracked
/// by the warehouse aggregate. Stock is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    category: String,
    supplier_id: Option<SupplierId>,
    stock: i64,
    pricing: Pricing,
    status: ProductStatus,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            sku: String::new(),
            name: String::new(),
            category: String::new(),
            supplier_id: None,
            stock: 0,
            pricing: Pricing::default(),
            status: ProductStatus::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn net_price(&self) -> Money {
        self.pricing.net_price
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    /// Whether the product is in a sellable state (stock is checked at sale
    /// time, not here).
    pub fn can_be_sold(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub supplier_id: SupplierId,
    pub initial_stock: i64,
    pub pricing: Pricing,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordSale (a single unit over the counter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSale {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveStock (delivery from the declared supplier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub product_id: ProductId,
    pub supplier_id: SupplierId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustStock (signed movement: returns, exchanges, restock credit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub product_id: ProductId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ArchiveProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    RegisterProduct(RegisterProduct),
    RecordSale(RecordSale),
    ReceiveStock(ReceiveStock),
    AdjustStock(AdjustStock),
    ArchiveProduct(ArchiveProduct),
}

/// Event: ProductRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRegistered {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub supplier_id: SupplierId,
    pub initial_stock: i64,
    pub pricing: Pricing,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UnitSold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSold {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReceived {
    pub product_id: ProductId,
    pub supplier_id: SupplierId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub product_id: ProductId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductArchived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductArchived {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductRegistered(ProductRegistered),
    UnitSold(UnitSold),
    StockReceived(StockReceived),
    StockAdjusted(StockAdjusted),
    ProductArchived(ProductArchived),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductRegistered(_) => "catalog.product.registered",
            ProductEvent::UnitSold(_) => "catalog.product.unit_sold",
            ProductEvent::StockReceived(_) => "catalog.product.stock_received",
            ProductEvent::StockAdjusted(_) => "catalog.product.stock_adjusted",
            ProductEvent::ProductArchived(_) => "catalog.product.archived",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductRegistered(e) => e.occurred_at,
            ProductEvent::UnitSold(e) => e.occurred_at,
            ProductEvent::StockReceived(e) => e.occurred_at,
            ProductEvent::StockAdjusted(e) => e.occurred_at,
            ProductEvent::ProductArchived(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductRegistered(e) => {
                self.id = e.product_id;
                self.sku = e.sku.clone();
                self.name = e.name.clone();
                self.category = e.category.clone();
                self.supplier_id = Some(e.supplier_id);
                self.stock = e.initial_stock;
                self.pricing = e.pricing;
                self.status = ProductStatus::Active;
                self.created = true;
            }
            ProductEvent::UnitSold(_) => {
                self.stock -= 1;
            }
            ProductEvent::StockReceived(e) => {
                self.stock += e.quantity;
            }
            ProductEvent::StockAdjusted(e) => {
                self.stock += e.delta;
            }
            ProductEvent::ProductArchived(_) => {
                self.status = ProductStatus::Archived;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::RegisterProduct(cmd) => self.handle_register(cmd),
            ProductCommand::RecordSale(cmd) => self.handle_record_sale(cmd),
            ProductCommand::ReceiveStock(cmd) => self.handle_receive_stock(cmd),
            ProductCommand::AdjustStock(cmd) => self.handle_adjust_stock(cmd),
            ProductCommand::ArchiveProduct(cmd) => self.handle_archive(cmd),
        }
    }
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }

        if cmd.sku.trim().is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if cmd.initial_stock < 0 {
            return Err(DomainError::validation("initial stock cannot be negative"));
        }

        if cmd.pricing.net_price.is_negative() {
            return Err(DomainError::validation("net price cannot be negative"));
        }

        Ok(vec![ProductEvent::ProductRegistered(ProductRegistered {
            product_id: cmd.product_id,
            sku: cmd.sku.clone(),
            name: cmd.name.clone(),
            category: cmd.category.clone(),
            supplier_id: cmd.supplier_id,
            initial_stock: cmd.initial_stock,
            pricing: cmd.pricing,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_sale(&self, cmd: &RecordSale) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        if !self.can_be_sold() {
            return Err(DomainError::invariant("archived products cannot be sold"));
        }

        if self.stock == 0 {
            return Err(DomainError::out_of_stock(self.name.clone()));
        }

        Ok(vec![ProductEvent::UnitSold(UnitSold {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receive_stock(&self, cmd: &ReceiveStock) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        if self.supplier_id != Some(cmd.supplier_id) {
            return Err(DomainError::wrong_supplier(self.name.clone()));
        }

        Ok(vec![ProductEvent::StockReceived(StockReceived {
            product_id: cmd.product_id,
            supplier_id: cmd.supplier_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_adjust_stock(&self, cmd: &AdjustStock) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        if cmd.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        if self.stock + cmd.delta < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        Ok(vec![ProductEvent::StockAdjusted(StockAdjusted {
            product_id: cmd.product_id,
            delta: cmd.delta,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &ArchiveProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        if self.status == ProductStatus::Archived {
            return Err(DomainError::conflict("product is already archived"));
        }

        Ok(vec![ProductEvent::ProductArchived(ProductArchived {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
