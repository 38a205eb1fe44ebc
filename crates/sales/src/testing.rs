//! Shared fixtures for the transaction tests.

use chrono::Utc;

use ventapos_catalog::{Pricing, Product, ProductCommand, RegisterProduct};
use ventapos_core::{Aggregate, CustomerId, Money, ProductId, SellerId, SupplierId};
use ventapos_parties::{
    Customer, CustomerCommand, PersonInfo, RegisterCustomer, RegisterSeller, Seller, SellerCommand,
};

pub fn customer_with_balance(balance: Money) -> Customer {
    let customer_id = CustomerId::new();
    let mut customer = Customer::empty(customer_id);
    let cmd = CustomerCommand::RegisterCustomer(RegisterCustomer {
        customer_id,
        person: PersonInfo::new("Ada", "Lovelace").with_email("ada@example.com"),
        agreement: "standard".to_string(),
        opening_balance: balance,
        occurred_at: Utc::now(),
    });
    let events = customer.handle(&cmd).unwrap();
    customer.apply(&events[0]);
    customer
}

pub fn seller() -> Seller {
    seller_with_commission(Money::ZERO)
}

pub fn seller_with_commission(commission: Money) -> Seller {
    let seller_id = SellerId::new();
    let mut seller = Seller::empty(seller_id);
    let cmd = SellerCommand::RegisterSeller(RegisterSeller {
        seller_id,
        person: PersonInfo::new("Grace", "Hopper"),
        section: "Electronics".to_string(),
        night_shift: false,
        opening_commission: commission,
        occurred_at: Utc::now(),
    });
    let events = seller.handle(&cmd).unwrap();
    seller.apply(&events[0]);
    seller
}

pub fn product_with_stock(stock: i64, net_price: Money) -> (Product, SupplierId) {
    let product_id = ProductId::new();
    let supplier_id = SupplierId::new();
    let mut product = Product::empty(product_id);
    let cmd = ProductCommand::RegisterProduct(RegisterProduct {
        product_id,
        sku: "SKU-001".to_string(),
        name: "Monitor".to_string(),
        category: "Electronics".to_string(),
        supplier_id,
        initial_stock: stock,
        pricing: Pricing::net(net_price),
        occurred_at: Utc::now(),
    });
    let events = product.handle(&cmd).unwrap();
    product.apply(&events[0]);
    (product, supplier_id)
}
