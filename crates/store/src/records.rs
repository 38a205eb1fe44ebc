//! Plain entity records exchanged with the excluded persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ventapos_catalog::{Pricing, Product};
use ventapos_core::{CustomerId, DomainError, Money, ProductId, SellerId, SupplierId};
use ventapos_parties::{Customer, PersonKind, Seller, Supplier};

/// Customer as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub balance: Money,
    pub agreement: String,
    pub registered_at: DateTime<Utc>,
}

/// Seller as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRecord {
    pub id: SellerId,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub section: String,
    pub commission: Money,
    pub night_shift: bool,
}

/// Supplier as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub id: SupplierId,
    pub tax_id: String,
    pub legal_name: String,
    pub trade_name: String,
    pub country: String,
    pub person_kind: PersonKind,
}

/// Product as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub supplier: SupplierId,
    pub stock: i64,
    pub net_price: Money,
    pub discount_bps: u32,
    pub tax_rate_bps: u32,
}

impl ProductRecord {
    pub fn pricing(&self) -> Pricing {
        Pricing {
            net_price: self.net_price,
            tax_rate_bps: self.tax_rate_bps,
            discount_bps: self.discount_bps,
        }
    }
}

/// Everything the external layer loads at startup and saves afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub customers: Vec<CustomerRecord>,
    pub sellers: Vec<SellerRecord>,
    pub suppliers: Vec<SupplierRecord>,
    pub products: Vec<ProductRecord>,
}

impl From<&Customer> for CustomerRecord {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id_typed(),
            name: customer.person().name.clone(),
            surname: customer.person().surname.clone(),
            email: customer.person().email.clone(),
            balance: customer.balance(),
            agreement: customer.agreement().to_string(),
            registered_at: customer.registered_at(),
        }
    }
}

impl From<&Seller> for SellerRecord {
    fn from(seller: &Seller) -> Self {
        Self {
            id: seller.id_typed(),
            name: seller.person().name.clone(),
            surname: seller.person().surname.clone(),
            email: seller.person().email.clone(),
            section: seller.section().to_string(),
            commission: seller.commission(),
            night_shift: seller.night_shift(),
        }
    }
}

impl From<&Supplier> for SupplierRecord {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id_typed(),
            tax_id: supplier.tax_id().to_string(),
            legal_name: supplier.legal_name().to_string(),
            trade_name: supplier.trade_name().to_string(),
            country: supplier.country().to_string(),
            person_kind: supplier.person_kind(),
        }
    }
}

impl TryFrom<&Product> for ProductRecord {
    type Error = DomainError;

    fn try_from(product: &Product) -> Result<Self, Self::Error> {
        let supplier = product
            .supplier_id()
            .ok_or_else(|| DomainError::invariant("product has no supplier"))?;
        Ok(Self {
            id: product.id_typed(),
            sku: product.sku().to_string(),
            name: product.name().to_string(),
            category: product.category().to_string(),
            supplier,
            stock: product.stock(),
            net_price: product.pricing().net_price,
            discount_bps: product.pricing().discount_bps,
            tax_rate_bps: product.pricing().tax_rate_bps,
        })
    }
}
