//! End-to-end commit flows: the commit engine driving the SQLite store
//! against an in-memory database.

use chrono::Utc;
use uuid::Uuid;

use tillbook_core::{
    Catalog, CoreError, InvoiceStatus, Product, Shop, Supply, SupplyItem, SupplyStatus,
    Transaction, TransactionDraft, VatRate,
};
use tillbook_db::{Database, DbConfig, SqliteStore};
use tillbook_engine::{CommitError, CommitMode, Committer, TransactionStore};

async fn setup() -> (Committer<SqliteStore>, String) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let shop = Shop {
        id: Uuid::new_v4().to_string(),
        name: "Test Shop".to_string(),
        vat_rate_bps: None,
        currency: "USD".to_string(),
        created_at: Utc::now(),
    };
    db.shops().insert(&shop).await.unwrap();

    for (id, sku, price_cents, stock) in [
        ("widget", "WIDGET-1", 500_i64, 10_i64),
        ("gadget", "GADGET-1", 1250, 4),
    ] {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: id.to_string(),
                shop_id: shop.id.clone(),
                sku: sku.to_string(),
                name: format!("Product {id}"),
                price_cents,
                cost_cents: Some(price_cents / 2),
                stock,
                min_stock: Some(2),
                category_id: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    (Committer::new(SqliteStore::new(db)), shop.id)
}

async fn fresh_catalog(committer: &Committer<SqliteStore>, shop_id: &str) -> Catalog {
    Catalog::new(committer.store().list_products(shop_id).await.unwrap())
}

fn vat10() -> VatRate {
    VatRate::from_bps(1000)
}

#[tokio::test]
async fn sale_commit_roundtrips_through_sqlite() {
    let (committer, shop_id) = setup().await;
    let catalog = fresh_catalog(&committer, &shop_id).await;

    let mut draft = TransactionDraft::sale(shop_id.as_str());
    draft.set_line_product(0, "widget", &catalog);
    draft.set_line_quantity(0, 3);

    let tx = committer
        .commit(&draft, &catalog, vat10(), CommitMode::Create)
        .await
        .unwrap();
    let Transaction::Sale(sale) = tx else {
        panic!("expected a sale");
    };

    // Stock moved on disk
    let widget = committer.store().get_product("widget").await.unwrap();
    assert_eq!(widget.stock, 7);

    // The persisted record matches what the committer returned
    let persisted = committer.store().get_sale(&sale.id).await.unwrap();
    assert_eq!(persisted.sale_number, sale.sale_number);
    assert_eq!(persisted.subtotal_cents, 1500);
    assert_eq!(persisted.tax_cents, 150);
    assert_eq!(persisted.total_cents, 1650);
    assert_eq!(persisted.items.len(), 1);
    assert_eq!(persisted.items[0].sku_snapshot, "WIDGET-1");
    assert_eq!(persisted.items[0].quantity, 3);

    let listed = committer
        .store()
        .database()
        .sales()
        .list_by_shop(&shop_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn oversell_leaves_database_untouched() {
    let (committer, shop_id) = setup().await;
    let catalog = fresh_catalog(&committer, &shop_id).await;

    let mut draft = TransactionDraft::sale(shop_id.as_str());
    draft.set_line_product(0, "widget", &catalog);
    draft.set_line_quantity(0, 11);

    let err = committer
        .commit(&draft, &catalog, vat10(), CommitMode::Create)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommitError::Validation(CoreError::InsufficientStock { .. })
    ));

    assert_eq!(
        committer.store().get_product("widget").await.unwrap().stock,
        10
    );
    assert!(committer
        .store()
        .database()
        .sales()
        .list_by_shop(&shop_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn invoice_edit_restores_and_reapplies_on_disk() {
    let (committer, shop_id) = setup().await;
    let catalog = fresh_catalog(&committer, &shop_id).await;

    let mut draft = TransactionDraft::invoice(shop_id.as_str());
    draft.customer_name = "Ada Lovelace".to_string();
    draft.due_date = Some(Utc::now());
    draft.set_line_product(0, "widget", &catalog);
    draft.set_line_quantity(0, 5);

    let original = match committer
        .commit(&draft, &catalog, vat10(), CommitMode::Create)
        .await
        .unwrap()
    {
        Transaction::Invoice(invoice) => invoice,
        Transaction::Sale(_) => panic!("expected an invoice"),
    };
    assert_eq!(
        committer.store().get_product("widget").await.unwrap().stock,
        5
    );

    // Edit: 5 in stock + 5 reserved by this invoice = 10 available
    let catalog = fresh_catalog(&committer, &shop_id).await;
    let mut edit = TransactionDraft::invoice(shop_id.as_str());
    edit.customer_name = "Ada Lovelace".to_string();
    edit.due_date = Some(Utc::now());
    edit.set_line_product(0, "widget", &catalog);
    edit.set_line_quantity(0, 8);

    committer
        .commit(
            &edit,
            &catalog,
            vat10(),
            CommitMode::Edit {
                original: original.clone(),
            },
        )
        .await
        .unwrap();

    // Restored to 10, then took 8
    assert_eq!(
        committer.store().get_product("widget").await.unwrap().stock,
        2
    );

    let persisted = committer.store().get_invoice(&original.id).await.unwrap();
    assert_eq!(persisted.invoice_number, original.invoice_number);
    assert_eq!(persisted.items.len(), 1);
    assert_eq!(persisted.items[0].quantity, 8);
    assert_eq!(persisted.subtotal_cents, 4000);
}

#[tokio::test]
async fn conversion_is_one_way_and_status_patch_is_metadata_only() {
    let (committer, shop_id) = setup().await;
    let catalog = fresh_catalog(&committer, &shop_id).await;

    let mut draft = TransactionDraft::sale(shop_id.as_str());
    draft.set_line_product(0, "gadget", &catalog);
    draft.set_line_quantity(0, 2);

    let sale = match committer
        .commit(&draft, &catalog, vat10(), CommitMode::Create)
        .await
        .unwrap()
    {
        Transaction::Sale(sale) => sale,
        Transaction::Invoice(_) => panic!("expected a sale"),
    };
    assert_eq!(
        committer.store().get_product("gadget").await.unwrap().stock,
        2
    );

    let invoice = committer.convert_sale_to_invoice(&sale.id).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert!(invoice.paid_at.is_some());
    assert_eq!(invoice.total_cents, sale.total_cents);

    // Conversion did not move stock again
    assert_eq!(
        committer.store().get_product("gadget").await.unwrap().stock,
        2
    );

    // The link is persisted and one-way
    let persisted = committer.store().get_sale(&sale.id).await.unwrap();
    assert_eq!(persisted.invoice_id.as_deref(), Some(invoice.id.as_str()));
    let err = committer
        .convert_sale_to_invoice(&sale.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CommitError::AlreadyConverted { .. }));

    // Status patch keeps items/totals and stock intact
    let overdue = committer
        .set_invoice_status(&invoice.id, InvoiceStatus::Overdue)
        .await
        .unwrap();
    assert_eq!(overdue.status, InvoiceStatus::Overdue);
    assert_eq!(overdue.paid_at, invoice.paid_at);
    assert_eq!(overdue.total_cents, invoice.total_cents);
    assert_eq!(
        committer.store().get_product("gadget").await.unwrap().stock,
        2
    );
}

#[tokio::test]
async fn supply_receipt_increments_stock_exactly_once() {
    let (committer, shop_id) = setup().await;

    let supply = Supply {
        id: Uuid::new_v4().to_string(),
        shop_id: shop_id.clone(),
        supplier_name: "Harbor Imports".to_string(),
        status: SupplyStatus::Ordered,
        created_at: Utc::now(),
        received_at: None,
        items: vec![SupplyItem {
            product_id: "widget".to_string(),
            quantity: 6,
            unit_cost_cents: 250,
        }],
    };
    committer
        .store()
        .database()
        .supplies()
        .insert(&supply)
        .await
        .unwrap();

    let received = committer.receive_supply(&supply.id).await.unwrap();
    assert_eq!(received.status, SupplyStatus::Received);
    assert_eq!(
        committer.store().get_product("widget").await.unwrap().stock,
        16
    );

    let err = committer.receive_supply(&supply.id).await.unwrap_err();
    assert!(matches!(err, CommitError::SupplyNotReceivable { .. }));
    assert_eq!(
        committer.store().get_product("widget").await.unwrap().stock,
        16
    );
}

#[tokio::test]
async fn deleting_an_invoice_keeps_stock_and_cascades_items() {
    let (committer, shop_id) = setup().await;
    let catalog = fresh_catalog(&committer, &shop_id).await;

    let mut draft = TransactionDraft::invoice(shop_id.as_str());
    draft.customer_name = "Grace Hopper".to_string();
    draft.due_date = Some(Utc::now());
    draft.set_line_product(0, "widget", &catalog);
    draft.set_line_quantity(0, 4);

    let invoice = match committer
        .commit(&draft, &catalog, vat10(), CommitMode::Create)
        .await
        .unwrap()
    {
        Transaction::Invoice(invoice) => invoice,
        Transaction::Sale(_) => panic!("expected an invoice"),
    };

    committer.delete_invoice(&invoice.id).await.unwrap();
    assert!(committer.store().get_invoice(&invoice.id).await.is_err());

    // Stock deliberately not restored
    assert_eq!(
        committer.store().get_product("widget").await.unwrap().stock,
        6
    );
}
