//! The single-writer application state.
//!
//! One `AppState` per process, no global mutable collections: every aggregate
//! is owned here, operations are keyed by id, and each applied event lands in
//! the journal. Single-threaded by contract; no locking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use ventapos_catalog::{Pricing, Product, ProductCommand, RegisterProduct};
use ventapos_core::{
    BranchId, CustomerId, DomainError, DomainResult, Money, ProductId, PurchaseOrderId, SellerId,
    SupplierId, WarehouseId,
};
use ventapos_events::{commit, EventRecord, Journal};
use ventapos_parties::{
    AddToCart, ClearCart, Customer, CustomerCommand, Deposit, PersonInfo, PersonKind,
    RegisterCustomer, RegisterSeller, RegisterSupplier, Seller, SellerCommand, Supplier,
    SupplierCommand,
};
use ventapos_purchasing::{
    receive_from_supplier, OpenPurchaseOrder, PurchaseOrder, PurchaseOrderCommand, SupplyOutcome,
};
use ventapos_sales::{
    exchange_product, execute_sale, redeem_commission, return_product, ExchangeOutcome,
    RedemptionOutcome, ReturnOutcome, SaleOutcome,
};
use ventapos_warehouse::{
    restock, Branch, BranchCommand, ListProduct, OpenBranch, OpenWarehouse, ReceiveCentralStock,
    RestockReport, Warehouse, WarehouseCommand,
};

use crate::records::{CustomerRecord, ProductRecord, SellerRecord, Snapshot, SupplierRecord};

/// Owns every aggregate plus the event journal.
#[derive(Debug, Clone)]
pub struct AppState {
    customers: HashMap<CustomerId, Customer>,
    sellers: HashMap<SellerId, Seller>,
    suppliers: HashMap<SupplierId, Supplier>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    branch: Branch,
    warehouse: Warehouse,
    journal: Journal,
}

impl AppState {
    /// Fresh state with one branch and its central warehouse.
    pub fn new(branch_name: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut journal = Journal::new();

        let branch_id = BranchId::new();
        let mut branch = Branch::empty(branch_id);
        commit(
            &mut branch,
            &BranchCommand::OpenBranch(OpenBranch {
                branch_id,
                name: branch_name.to_string(),
                occurred_at: now,
            }),
            &mut journal,
        )?;

        let warehouse_id = WarehouseId::new();
        let mut warehouse = Warehouse::empty(warehouse_id);
        commit(
            &mut warehouse,
            &WarehouseCommand::OpenWarehouse(OpenWarehouse {
                warehouse_id,
                name: "Central Warehouse".to_string(),
                occurred_at: now,
            }),
            &mut journal,
        )?;

        Ok(Self {
            customers: HashMap::new(),
            sellers: HashMap::new(),
            suppliers: HashMap::new(),
            products: HashMap::new(),
            orders: HashMap::new(),
            branch,
            warehouse,
            journal,
        })
    }

    /// Rebuild state from persisted records.
    ///
    /// Registration events are replayed with the persisted identity fields;
    /// customer registration timestamps are carried through unchanged. Every
    /// loaded product is listed at the branch in record order.
    pub fn from_snapshot(
        branch_name: &str,
        snapshot: Snapshot,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut state = Self::new(branch_name, now)?;

        for record in &snapshot.suppliers {
            state.insert_supplier(record, now)?;
        }
        for record in &snapshot.sellers {
            state.insert_seller(record, now)?;
        }
        for record in &snapshot.customers {
            state.insert_customer(record)?;
        }
        for record in &snapshot.products {
            state.insert_product(record, now)?;
            state.list_at_branch(record.id, now)?;
        }

        tracing::info!(
            customers = snapshot.customers.len(),
            sellers = snapshot.sellers.len(),
            suppliers = snapshot.suppliers.len(),
            products = snapshot.products.len(),
            "state loaded from snapshot"
        );

        Ok(state)
    }

    /// Updated records for re-serialization, sorted by id for determinism.
    pub fn snapshot(&self) -> DomainResult<Snapshot> {
        let mut customers: Vec<CustomerRecord> =
            self.customers.values().map(CustomerRecord::from).collect();
        customers.sort_by_key(|r| r.id);

        let mut sellers: Vec<SellerRecord> =
            self.sellers.values().map(SellerRecord::from).collect();
        sellers.sort_by_key(|r| r.id);

        let mut suppliers: Vec<SupplierRecord> =
            self.suppliers.values().map(SupplierRecord::from).collect();
        suppliers.sort_by_key(|r| r.id);

        let mut products = self
            .products
            .values()
            .map(ProductRecord::try_from)
            .collect::<DomainResult<Vec<ProductRecord>>>()?;
        products.sort_by_key(|r| r.id);

        Ok(Snapshot {
            customers,
            sellers,
            suppliers,
            products,
        })
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn register_customer(
        &mut self,
        person: PersonInfo,
        agreement: &str,
        opening_balance: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<CustomerId> {
        let record = CustomerRecord {
            id: CustomerId::new(),
            name: person.name,
            surname: person.surname,
            email: person.email,
            balance: opening_balance,
            agreement: agreement.to_string(),
            registered_at: now,
        };
        self.insert_customer(&record)?;
        Ok(record.id)
    }

    pub fn register_seller(
        &mut self,
        person: PersonInfo,
        section: &str,
        night_shift: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<SellerId> {
        let record = SellerRecord {
            id: SellerId::new(),
            name: person.name,
            surname: person.surname,
            email: person.email,
            section: section.to_string(),
            commission: Money::ZERO,
            night_shift,
        };
        self.insert_seller(&record, now)?;
        Ok(record.id)
    }

    pub fn register_supplier(
        &mut self,
        tax_id: &str,
        legal_name: &str,
        trade_name: &str,
        country: &str,
        person_kind: PersonKind,
        now: DateTime<Utc>,
    ) -> DomainResult<SupplierId> {
        let record = SupplierRecord {
            id: SupplierId::new(),
            tax_id: tax_id.to_string(),
            legal_name: legal_name.to_string(),
            trade_name: trade_name.to_string(),
            country: country.to_string(),
            person_kind,
        };
        self.insert_supplier(&record, now)?;
        Ok(record.id)
    }

    pub fn register_product(
        &mut self,
        sku: &str,
        name: &str,
        category: &str,
        supplier_id: SupplierId,
        initial_stock: i64,
        pricing: Pricing,
        now: DateTime<Utc>,
    ) -> DomainResult<ProductId> {
        if !self.suppliers.contains_key(&supplier_id) {
            return Err(DomainError::NotFound);
        }
        let record = ProductRecord {
            id: ProductId::new(),
            sku: sku.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            supplier: supplier_id,
            stock: initial_stock,
            net_price: pricing.net_price,
            discount_bps: pricing.discount_bps,
            tax_rate_bps: pricing.tax_rate_bps,
        };
        self.insert_product(&record, now)?;
        Ok(record.id)
    }

    /// Start carrying a product at the branch (restock passes cover it from
    /// then on).
    pub fn list_at_branch(&mut self, product_id: ProductId, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.products.contains_key(&product_id) {
            return Err(DomainError::NotFound);
        }
        let branch_id = self.branch.id_typed();
        commit(
            &mut self.branch,
            &BranchCommand::ListProduct(ListProduct {
                branch_id,
                product_id,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Add to (or, with a negative amount, debit) a customer's balance.
    /// Returns the new balance.
    pub fn deposit(
        &mut self,
        customer_id: CustomerId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<Money> {
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        commit(
            customer,
            &CustomerCommand::Deposit(Deposit {
                customer_id,
                amount,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        Ok(customer.balance())
    }

    pub fn sell(
        &mut self,
        seller_id: SellerId,
        customer_id: CustomerId,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> DomainResult<SaleOutcome> {
        let seller = self
            .sellers
            .get_mut(&seller_id)
            .ok_or(DomainError::NotFound)?;
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(DomainError::NotFound)?;
        execute_sale(seller, customer, product, &mut self.journal, now)
    }

    pub fn exchange(
        &mut self,
        customer_id: CustomerId,
        incoming_id: ProductId,
        outgoing_id: ProductId,
        now: DateTime<Utc>,
    ) -> DomainResult<ExchangeOutcome> {
        if incoming_id == outgoing_id {
            return Err(DomainError::validation(
                "exchange requires two distinct products",
            ));
        }
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        let [incoming, outgoing] = self.products.get_disjoint_mut([&incoming_id, &outgoing_id]);
        let incoming = incoming.ok_or(DomainError::NotFound)?;
        let outgoing = outgoing.ok_or(DomainError::NotFound)?;
        exchange_product(customer, incoming, outgoing, &mut self.journal, now)
    }

    pub fn return_product(
        &mut self,
        customer_id: CustomerId,
        product_id: ProductId,
        good_condition: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOutcome> {
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(DomainError::NotFound)?;
        return_product(customer, product, good_condition, &mut self.journal, now)
    }

    pub fn redeem_commission(
        &mut self,
        seller_id: SellerId,
        other_id: SellerId,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> DomainResult<RedemptionOutcome> {
        if seller_id == other_id {
            return Err(DomainError::validation(
                "redemption requires two distinct sellers",
            ));
        }
        let [seller, other] = self.sellers.get_disjoint_mut([&seller_id, &other_id]);
        let seller = seller.ok_or(DomainError::NotFound)?;
        let other = other.ok_or(DomainError::NotFound)?;
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(DomainError::NotFound)?;
        redeem_commission(seller, other, product, &mut self.journal, now)
    }

    /// Deliver supplier stock straight to the shelf.
    pub fn supply(
        &mut self,
        supplier_id: SupplierId,
        product_id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<SupplyOutcome> {
        if !self.suppliers.contains_key(&supplier_id) {
            return Err(DomainError::NotFound);
        }
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(DomainError::NotFound)?;
        receive_from_supplier(product, supplier_id, quantity, &mut self.journal, now)
    }

    /// Add stock on the central (warehouse) side.
    pub fn add_central_stock(
        &mut self,
        product_id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.products.contains_key(&product_id) {
            return Err(DomainError::NotFound);
        }
        let warehouse_id = self.warehouse.id_typed();
        commit(
            &mut self.warehouse,
            &WarehouseCommand::ReceiveCentralStock(ReceiveCentralStock {
                warehouse_id,
                product_id,
                quantity,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        Ok(())
    }

    /// One restock pass over everything the branch carries.
    pub fn restock_branch(&mut self, now: DateTime<Utc>) -> DomainResult<RestockReport> {
        restock::run_pass(
            &mut self.warehouse,
            &self.branch,
            &mut self.products,
            &mut self.journal,
            now,
        )
    }

    pub fn open_purchase_order(
        &mut self,
        product_id: ProductId,
        dispatch: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrderId> {
        if !self.products.contains_key(&product_id) {
            return Err(DomainError::NotFound);
        }
        let order_id = PurchaseOrderId::new();
        let mut order = PurchaseOrder::empty(order_id);
        commit(
            &mut order,
            &PurchaseOrderCommand::OpenPurchaseOrder(OpenPurchaseOrder {
                order_id,
                product_id,
                dispatch,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        self.orders.insert(order_id, order);
        Ok(order_id)
    }

    pub fn purchase_order_total(&self, order_id: PurchaseOrderId) -> DomainResult<Money> {
        let order = self.orders.get(&order_id).ok_or(DomainError::NotFound)?;
        let product_id = order.product_id().ok_or(DomainError::NotFound)?;
        let product = self.products.get(&product_id).ok_or(DomainError::NotFound)?;
        order.total(product)
    }

    pub fn average_purchase_value(&self, customer_id: CustomerId) -> DomainResult<Money> {
        let customer = self
            .customers
            .get(&customer_id)
            .ok_or(DomainError::NotFound)?;
        Ok(customer.average_purchase_value())
    }

    pub fn add_to_cart(
        &mut self,
        customer_id: CustomerId,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.products.contains_key(&product_id) {
            return Err(DomainError::NotFound);
        }
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        commit(
            customer,
            &CustomerCommand::AddToCart(AddToCart {
                customer_id,
                product_id,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        Ok(())
    }

    pub fn clear_cart(&mut self, customer_id: CustomerId, now: DateTime<Utc>) -> DomainResult<()> {
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or(DomainError::NotFound)?;
        commit(
            customer,
            &CustomerCommand::ClearCart(ClearCart {
                customer_id,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn customer(&self, customer_id: CustomerId) -> DomainResult<&Customer> {
        self.customers.get(&customer_id).ok_or(DomainError::NotFound)
    }

    pub fn seller(&self, seller_id: SellerId) -> DomainResult<&Seller> {
        self.sellers.get(&seller_id).ok_or(DomainError::NotFound)
    }

    pub fn supplier(&self, supplier_id: SupplierId) -> DomainResult<&Supplier> {
        self.suppliers.get(&supplier_id).ok_or(DomainError::NotFound)
    }

    pub fn product(&self, product_id: ProductId) -> DomainResult<&Product> {
        self.products.get(&product_id).ok_or(DomainError::NotFound)
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn journal_records(&self) -> &[EventRecord] {
        self.journal.records()
    }

    // ------------------------------------------------------------------
    // Record loading
    // ------------------------------------------------------------------

    fn insert_customer(&mut self, record: &CustomerRecord) -> DomainResult<()> {
        if self.customers.contains_key(&record.id) {
            return Err(DomainError::conflict("customer already registered"));
        }
        let mut person = PersonInfo::new(record.name.clone(), record.surname.clone());
        person.email = record.email.clone();
        let mut customer = Customer::empty(record.id);
        commit(
            &mut customer,
            &CustomerCommand::RegisterCustomer(RegisterCustomer {
                customer_id: record.id,
                person,
                agreement: record.agreement.clone(),
                opening_balance: record.balance,
                // Registration time is immutable; loading replays the
                // persisted timestamp, not the load time.
                occurred_at: record.registered_at,
            }),
            &mut self.journal,
        )?;
        self.customers.insert(record.id, customer);
        Ok(())
    }

    fn insert_seller(&mut self, record: &SellerRecord, now: DateTime<Utc>) -> DomainResult<()> {
        if self.sellers.contains_key(&record.id) {
            return Err(DomainError::conflict("seller already registered"));
        }
        let mut person = PersonInfo::new(record.name.clone(), record.surname.clone());
        person.email = record.email.clone();
        let mut seller = Seller::empty(record.id);
        commit(
            &mut seller,
            &SellerCommand::RegisterSeller(RegisterSeller {
                seller_id: record.id,
                person,
                section: record.section.clone(),
                night_shift: record.night_shift,
                opening_commission: record.commission,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        self.sellers.insert(record.id, seller);
        Ok(())
    }

    fn insert_supplier(&mut self, record: &SupplierRecord, now: DateTime<Utc>) -> DomainResult<()> {
        if self.suppliers.contains_key(&record.id) {
            return Err(DomainError::conflict("supplier already registered"));
        }
        let mut supplier = Supplier::empty(record.id);
        commit(
            &mut supplier,
            &SupplierCommand::RegisterSupplier(RegisterSupplier {
                supplier_id: record.id,
                tax_id: record.tax_id.clone(),
                legal_name: record.legal_name.clone(),
                trade_name: record.trade_name.clone(),
                country: record.country.clone(),
                person_kind: record.person_kind,
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        self.suppliers.insert(record.id, supplier);
        Ok(())
    }

    fn insert_product(&mut self, record: &ProductRecord, now: DateTime<Utc>) -> DomainResult<()> {
        if self.products.contains_key(&record.id) {
            return Err(DomainError::conflict("product already registered"));
        }
        if !self.suppliers.contains_key(&record.supplier) {
            return Err(DomainError::NotFound);
        }
        let mut product = Product::empty(record.id);
        commit(
            &mut product,
            &ProductCommand::RegisterProduct(RegisterProduct {
                product_id: record.id,
                sku: record.sku.clone(),
                name: record.name.clone(),
                category: record.category.clone(),
                supplier_id: record.supplier,
                initial_stock: record.stock,
                pricing: record.pricing(),
                occurred_at: now,
            }),
            &mut self.journal,
        )?;
        self.products.insert(record.id, product);
        Ok(())
    }
}
