use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{Aggregate, AggregateRoot, DomainError, SupplierId};
use ventapos_events::Event;

/// Legal personality of a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Natural,
    Legal,
}

/// Aggregate root: Supplier.
///
/// Suppliers hold registration data only. The rule that a supplier may add
/// stock exclusively to its own products is enforced where the stock lives,
/// on the product aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    id: SupplierId,
    tax_id: String,
    legal_name: String,
    trade_name: String,
    country: String,
    person_kind: PersonKind,
    version: u64,
    created: bool,
}

impl Supplier {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: SupplierId) -> Self {
        Self {
            id,
            tax_id: String::new(),
            legal_name: String::new(),
            trade_name: String::new(),
            country: String::new(),
            person_kind: PersonKind::Legal,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SupplierId {
        self.id
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    pub fn legal_name(&self) -> &str {
        &self.legal_name
    }

    pub fn trade_name(&self) -> &str {
        &self.trade_name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn person_kind(&self) -> PersonKind {
        self.person_kind
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterSupplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSupplier {
    pub supplier_id: SupplierId,
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: String,
    pub country: String,
    pub person_kind: PersonKind,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierCommand {
    RegisterSupplier(RegisterSupplier),
}

/// Event: SupplierRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRegistered {
    pub supplier_id: SupplierId,
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: String,
    pub country: String,
    pub person_kind: PersonKind,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierEvent {
    SupplierRegistered(SupplierRegistered),
}

impl Event for SupplierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SupplierEvent::SupplierRegistered(_) => "parties.supplier.registered",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SupplierEvent::SupplierRegistered(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Supplier {
    type Command = SupplierCommand;
    type Event = SupplierEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SupplierEvent::SupplierRegistered(e) => {
                self.id = e.supplier_id;
                self.tax_id = e.tax_id.clone();
                self.legal_name = e.legal_name.clone();
                self.trade_name = e.trade_name.clone();
                self.country = e.country.clone();
                self.person_kind = e.person_kind;
                self.created = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SupplierCommand::RegisterSupplier(cmd) => self.handle_register(cmd),
        }
    }
}

impl Supplier {
    fn handle_register(&self, cmd: &RegisterSupplier) -> Result<Vec<SupplierEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("supplier already exists"));
        }

        if cmd.tax_id.trim().is_empty() {
            return Err(DomainError::validation("tax id cannot be empty"));
        }

        if cmd.legal_name.trim().is_empty() {
            return Err(DomainError::validation("legal name cannot be empty"));
        }

        Ok(vec![SupplierEvent::SupplierRegistered(SupplierRegistered {
            supplier_id: cmd.supplier_id,
            tax_id: cmd.tax_id.clone(),
            legal_name: cmd.legal_name.clone(),
            trade_name: cmd.trade_name.clone(),
            country: cmd.country.clone(),
            person_kind: cmd.person_kind,
            occurred_at: cmd.occurred_at,
        })])
    }
}
