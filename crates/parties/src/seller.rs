use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{Aggregate, AggregateRoot, DomainError, Money, SellerId};
use ventapos_events::Event;

use crate::person::PersonInfo;

/// Aggregate root: Seller.
///
/// Commission only grows through sale accrual and only shrinks through
/// redemption. It is signed: the redemption contract debits the initiating
/// seller without a sufficiency check, so the value can dip below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seller {
    id: SellerId,
    person: PersonInfo,
    section: String,
    commission: Money,
    night_shift: bool,
    version: u64,
    created: bool,
}

impl Seller {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: SellerId) -> Self {
        Self {
            id,
            person: PersonInfo::new("", ""),
            section: String::new(),
            commission: Money::ZERO,
            night_shift: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SellerId {
        self.id
    }

    pub fn person(&self) -> &PersonInfo {
        &self.person
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn commission(&self) -> Money {
        self.commission
    }

    pub fn night_shift(&self) -> bool {
        self.night_shift
    }
}

impl AggregateRoot for Seller {
    type Id = SellerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterSeller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSeller {
    pub seller_id: SellerId,
    pub person: PersonInfo,
    pub section: String,
    pub night_shift: bool,
    pub opening_commission: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AccrueCommission (earned on a completed sale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrueCommission {
    pub seller_id: SellerId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RedeemCommission (spent on a redemption).
///
/// No floor here: the redemption service checks the counterparty's balance and
/// debits both sellers per the redemption contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCommission {
    pub seller_id: SellerId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellerCommand {
    RegisterSeller(RegisterSeller),
    AccrueCommission(AccrueCommission),
    RedeemCommission(RedeemCommission),
}

/// Event: SellerRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRegistered {
    pub seller_id: SellerId,
    pub person: PersonInfo,
    pub section: String,
    pub night_shift: bool,
    pub opening_commission: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CommissionAccrued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionAccrued {
    pub seller_id: SellerId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CommissionRedeemed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRedeemed {
    pub seller_id: SellerId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellerEvent {
    SellerRegistered(SellerRegistered),
    CommissionAccrued(CommissionAccrued),
    CommissionRedeemed(CommissionRedeemed),
}

impl Event for SellerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SellerEvent::SellerRegistered(_) => "parties.seller.registered",
            SellerEvent::CommissionAccrued(_) => "parties.seller.commission_accrued",
            SellerEvent::CommissionRedeemed(_) => "parties.seller.commission_redeemed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SellerEvent::SellerRegistered(e) => e.occurred_at,
            SellerEvent::CommissionAccrued(e) => e.occurred_at,
            SellerEvent::CommissionRedeemed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Seller {
    type Command = SellerCommand;
    type Event = SellerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SellerEvent::SellerRegistered(e) => {
                self.id = e.seller_id;
                self.person = e.person.clone();
                self.section = e.section.clone();
                self.night_shift = e.night_shift;
                self.commission = e.opening_commission;
                self.created = true;
            }
            SellerEvent::CommissionAccrued(e) => {
                self.commission += e.amount;
            }
            SellerEvent::CommissionRedeemed(e) => {
                self.commission -= e.amount;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SellerCommand::RegisterSeller(cmd) => self.handle_register(cmd),
            SellerCommand::AccrueCommission(cmd) => self.handle_accrue(cmd),
            SellerCommand::RedeemCommission(cmd) => self.handle_redeem(cmd),
        }
    }
}

impl Seller {
    fn ensure_seller_id(&self, seller_id: SellerId) -> Result<(), DomainError> {
        if self.id != seller_id {
            return Err(DomainError::invariant("seller_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterSeller) -> Result<Vec<SellerEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("seller already exists"));
        }

        if cmd.person.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![SellerEvent::SellerRegistered(SellerRegistered {
            seller_id: cmd.seller_id,
            person: cmd.person.clone(),
            section: cmd.section.clone(),
            night_shift: cmd.night_shift,
            opening_commission: cmd.opening_commission,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_accrue(&self, cmd: &AccrueCommission) -> Result<Vec<SellerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_seller_id(cmd.seller_id)?;

        if cmd.amount.is_negative() {
            return Err(DomainError::validation(
                "accrued commission cannot be negative",
            ));
        }

        Ok(vec![SellerEvent::CommissionAccrued(CommissionAccrued {
            seller_id: cmd.seller_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_redeem(&self, cmd: &RedeemCommission) -> Result<Vec<SellerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_seller_id(cmd.seller_id)?;

        if cmd.amount.is_negative() {
            return Err(DomainError::validation(
                "redeemed commission cannot be negative",
            ));
        }

        Ok(vec![SellerEvent::CommissionRedeemed(CommissionRedeemed {
            seller_id: cmd.seller_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }
}
