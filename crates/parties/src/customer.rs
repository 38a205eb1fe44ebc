use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_core::{
    Aggregate, AggregateRoot, CustomerId, DomainError, Money, ProductId, ValueObject,
};
use ventapos_events::Event;

use crate::person::PersonInfo;

/// One entry in a customer's purchase history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub product_id: ProductId,
    pub net_price: Money,
    pub occurred_at: DateTime<Utc>,
}

impl ValueObject for PurchaseLine {}

/// Aggregate root: Customer.
///
/// The balance is signed: callers that debit it are responsible for the
/// sufficiency check, `Deposit` itself enforces no floor. The registration
/// timestamp is set once by the registration event and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    person: PersonInfo,
    balance: Money,
    registered_at: DateTime<Utc>,
    agreement: String,
    purchases: Vec<PurchaseLine>,
    cart: Vec<ProductId>,
    version: u64,
    created: bool,
}

impl Customer {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: CustomerId) -> Self {
        Self {
            id,
            person: PersonInfo::new("", ""),
            balance: Money::ZERO,
            registered_at: DateTime::<Utc>::UNIX_EPOCH,
            agreement: String::new(),
            purchases: Vec::new(),
            cart: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn person(&self) -> &PersonInfo {
        &self.person
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn agreement(&self) -> &str {
        &self.agreement
    }

    pub fn purchases(&self) -> &[PurchaseLine] {
        &self.purchases
    }

    pub fn cart(&self) -> &[ProductId] {
        &self.cart
    }

    /// Arithmetic mean of the net prices in the purchase history.
    ///
    /// A customer with no purchases averages to zero; that is a defined
    /// answer, not an error.
    pub fn average_purchase_value(&self) -> Money {
        if self.purchases.is_empty() {
            return Money::ZERO;
        }
        let total: Money = self.purchases.iter().map(|line| line.net_price).sum();
        Money::from_cents(total.cents() / self.purchases.len() as i64)
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCustomer {
    pub customer_id: CustomerId,
    pub person: PersonInfo,
    pub agreement: String,
    pub opening_balance: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Deposit.
///
/// The amount may be negative — debits from sales and exchanges run through
/// the same command. Sufficiency is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPurchase (append to the purchase history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPurchase {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub net_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddToCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerCommand {
    RegisterCustomer(RegisterCustomer),
    Deposit(Deposit),
    RecordPurchase(RecordPurchase),
    AddToCart(AddToCart),
    ClearCart(ClearCart),
}

/// Event: CustomerRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistered {
    pub customer_id: CustomerId,
    pub person: PersonInfo,
    pub agreement: String,
    pub opening_balance: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BalanceDeposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDeposited {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PurchaseRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecorded {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub net_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemAdded {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerEvent {
    CustomerRegistered(CustomerRegistered),
    BalanceDeposited(BalanceDeposited),
    PurchaseRecorded(PurchaseRecorded),
    CartItemAdded(CartItemAdded),
    CartCleared(CartCleared),
}

impl Event for CustomerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerEvent::CustomerRegistered(_) => "parties.customer.registered",
            CustomerEvent::BalanceDeposited(_) => "parties.customer.balance_deposited",
            CustomerEvent::PurchaseRecorded(_) => "parties.customer.purchase_recorded",
            CustomerEvent::CartItemAdded(_) => "parties.customer.cart_item_added",
            CustomerEvent::CartCleared(_) => "parties.customer.cart_cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CustomerEvent::CustomerRegistered(e) => e.occurred_at,
            CustomerEvent::BalanceDeposited(e) => e.occurred_at,
            CustomerEvent::PurchaseRecorded(e) => e.occurred_at,
            CustomerEvent::CartItemAdded(e) => e.occurred_at,
            CustomerEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Customer {
    type Command = CustomerCommand;
    type Event = CustomerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CustomerEvent::CustomerRegistered(e) => {
                self.id = e.customer_id;
                self.person = e.person.clone();
                self.balance = e.opening_balance;
                self.registered_at = e.occurred_at;
                self.agreement = e.agreement.clone();
                self.created = true;
            }
            CustomerEvent::BalanceDeposited(e) => {
                self.balance += e.amount;
            }
            CustomerEvent::PurchaseRecorded(e) => {
                self.purchases.push(PurchaseLine {
                    product_id: e.product_id,
                    net_price: e.net_price,
                    occurred_at: e.occurred_at,
                });
            }
            CustomerEvent::CartItemAdded(e) => {
                self.cart.push(e.product_id);
            }
            CustomerEvent::CartCleared(_) => {
                self.cart.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CustomerCommand::RegisterCustomer(cmd) => self.handle_register(cmd),
            CustomerCommand::Deposit(cmd) => self.handle_deposit(cmd),
            CustomerCommand::RecordPurchase(cmd) => self.handle_record_purchase(cmd),
            CustomerCommand::AddToCart(cmd) => self.handle_add_to_cart(cmd),
            CustomerCommand::ClearCart(cmd) => self.handle_clear_cart(cmd),
        }
    }
}

impl Customer {
    fn ensure_customer_id(&self, customer_id: CustomerId) -> Result<(), DomainError> {
        if self.id != customer_id {
            return Err(DomainError::invariant("customer_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterCustomer) -> Result<Vec<CustomerEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("customer already exists"));
        }

        if cmd.person.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![CustomerEvent::CustomerRegistered(CustomerRegistered {
            customer_id: cmd.customer_id,
            person: cmd.person.clone(),
            agreement: cmd.agreement.clone(),
            opening_balance: cmd.opening_balance,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deposit(&self, cmd: &Deposit) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_customer_id(cmd.customer_id)?;

        Ok(vec![CustomerEvent::BalanceDeposited(BalanceDeposited {
            customer_id: cmd.customer_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_purchase(
        &self,
        cmd: &RecordPurchase,
    ) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_customer_id(cmd.customer_id)?;

        if cmd.net_price.is_negative() {
            return Err(DomainError::validation("purchase price cannot be negative"));
        }

        Ok(vec![CustomerEvent::PurchaseRecorded(PurchaseRecorded {
            customer_id: cmd.customer_id,
            product_id: cmd.product_id,
            net_price: cmd.net_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_to_cart(&self, cmd: &AddToCart) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_customer_id(cmd.customer_id)?;

        Ok(vec![CustomerEvent::CartItemAdded(CartItemAdded {
            customer_id: cmd.customer_id,
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear_cart(&self, cmd: &ClearCart) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_customer_id(cmd.customer_id)?;

        if self.cart.is_empty() {
            return Err(DomainError::conflict("cart is already empty"));
        }

        Ok(vec![CustomerEvent::CartCleared(CartCleared {
            customer_id: cmd.customer_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn registered_customer(opening_balance: Money) -> Customer {
        let customer_id = CustomerId::new();
        let mut customer = Customer::empty(customer_id);
        let cmd = RegisterCustomer {
            customer_id,
            person: PersonInfo::new("Ada", "Lovelace").with_email("ada@example.com"),
            agreement: "standard".to_string(),
            opening_balance,
            occurred_at: test_time(),
        };
        let events = customer
            .handle(&CustomerCommand::RegisterCustomer(cmd))
            .unwrap();
        customer.apply(&events[0]);
        customer
    }

    fn deposit(customer: &mut Customer, amount: Money) {
        let cmd = Deposit {
            customer_id: customer.id_typed(),
            amount,
            occurred_at: test_time(),
        };
        let events = customer.handle(&CustomerCommand::Deposit(cmd)).unwrap();
        customer.apply(&events[0]);
    }

    fn record_purchase(customer: &mut Customer, net_price: Money) {
        let cmd = RecordPurchase {
            customer_id: customer.id_typed(),
            product_id: ProductId::new(),
            net_price,
            occurred_at: test_time(),
        };
        let events = customer
            .handle(&CustomerCommand::RecordPurchase(cmd))
            .unwrap();
        customer.apply(&events[0]);
    }

    #[test]
    fn registration_sets_balance_and_timestamp_once() {
        let customer = registered_customer(Money::from_major(100));
        assert_eq!(customer.balance(), Money::from_major(100));
        assert_eq!(customer.agreement(), "standard");
        assert!(customer.registered_at() > DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn deposit_accepts_negative_amounts_without_a_floor() {
        let mut customer = registered_customer(Money::from_major(100));
        deposit(&mut customer, Money::from_major(-250));
        assert_eq!(customer.balance(), Money::from_major(-150));
    }

    #[test]
    fn deposits_accumulate() {
        let mut customer = registered_customer(Money::ZERO);
        deposit(&mut customer, Money::from_major(50));
        deposit(&mut customer, Money::from_major(70));
        assert_eq!(customer.balance(), Money::from_major(120));
    }

    #[test]
    fn average_purchase_value_of_empty_history_is_exactly_zero() {
        let customer = registered_customer(Money::ZERO);
        assert_eq!(customer.average_purchase_value(), Money::ZERO);
    }

    #[test]
    fn average_purchase_value_is_the_mean_of_net_prices() {
        let mut customer = registered_customer(Money::ZERO);
        record_purchase(&mut customer, Money::from_major(1_000));
        record_purchase(&mut customer, Money::from_major(1_500));
        assert_eq!(customer.average_purchase_value(), Money::from_major(1_250));
    }

    #[test]
    fn cart_fills_and_clears() {
        let mut customer = registered_customer(Money::ZERO);
        let cmd = AddToCart {
            customer_id: customer.id_typed(),
            product_id: ProductId::new(),
            occurred_at: test_time(),
        };
        let events = customer.handle(&CustomerCommand::AddToCart(cmd)).unwrap();
        customer.apply(&events[0]);
        assert_eq!(customer.cart().len(), 1);

        let cmd = ClearCart {
            customer_id: customer.id_typed(),
            occurred_at: test_time(),
        };
        let events = customer.handle(&CustomerCommand::ClearCart(cmd)).unwrap();
        customer.apply(&events[0]);
        assert!(customer.cart().is_empty());
    }

    #[test]
    fn clearing_an_empty_cart_is_a_conflict() {
        let customer = registered_customer(Money::ZERO);
        let cmd = ClearCart {
            customer_id: customer.id_typed(),
            occurred_at: test_time(),
        };
        let err = customer
            .handle(&CustomerCommand::ClearCart(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the balance is exactly the opening balance plus the
            /// sum of all deposits, in any order.
            #[test]
            fn balance_is_sum_of_deposits(
                opening in -100_000i64..100_000,
                amounts in proptest::collection::vec(-100_000i64..100_000, 0..20)
            ) {
                let mut customer = registered_customer(Money::from_cents(opening));
                for cents in &amounts {
                    deposit(&mut customer, Money::from_cents(*cents));
                }
                let expected = opening + amounts.iter().sum::<i64>();
                prop_assert_eq!(customer.balance(), Money::from_cents(expected));
            }

            /// Property: the average never exceeds the maximum recorded price.
            #[test]
            fn average_is_bounded_by_extremes(
                prices in proptest::collection::vec(0i64..10_000_000, 1..20)
            ) {
                let mut customer = registered_customer(Money::ZERO);
                for cents in &prices {
                    record_purchase(&mut customer, Money::from_cents(*cents));
                }
                let avg = customer.average_purchase_value().cents();
                prop_assert!(avg <= *prices.iter().max().unwrap());
                prop_assert!(avg >= *prices.iter().min().unwrap() - 1);
            }
        }
    }
}
