//! Order repository tests against a live `PostgreSQL`.
//!
//! These tests require a running database:
//!
//! ```bash
//! export DATABASE_URL=postgres://localhost/lemongrass_test
//! cargo test -p lemongrass-site -- --ignored
//! ```
//!
//! Migrations are applied automatically before each test. Rows are left
//! behind; point `DATABASE_URL` at a throwaway database.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use lemongrass_core::{LineItem, OrderDraft, OrderId, OrderStatus, OrderType};
use lemongrass_site::db::{OrderRepository, RepositoryError};

async fn connect() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for repository tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

fn draft() -> OrderDraft {
    let price: Decimal = "12.50".parse().unwrap();
    OrderDraft {
        id: OrderId::generate(),
        order_type: OrderType::Pickup,
        customer_name: "An De Vries".to_owned(),
        customer_phone: "+32 470 12 34 56".to_owned(),
        customer_email: None,
        customer_address: None,
        items: vec![LineItem {
            id: "pad-thai".to_owned(),
            name: "Pad Thai".to_owned(),
            price,
            quantity: 2,
        }],
        subtotal: "25.00".parse().unwrap(),
        total: "25.00".parse().unwrap(),
        notes: None,
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn insert_stores_pending_with_gateway_reference() {
    let pool = connect().await;
    let repo = OrderRepository::new(&pool);

    let order = repo.insert(&draft()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.payment_reference.is_none());

    // Unique per run; payment references carry a unique index
    let reference = format!("tr_{}", order.id.as_uuid().simple());
    repo.set_payment_reference(order.id, &reference).await.unwrap();

    let stored = repo.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.payment_reference.as_deref(), Some(reference.as_str()));
    assert_eq!(stored.items, order.items);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn redelivered_paid_write_is_idempotent() {
    let pool = connect().await;
    let repo = OrderRepository::new(&pool);
    let order = repo.insert(&draft()).await.unwrap();

    repo.update_status(order.id, OrderStatus::Paid).await.unwrap();
    // The provider redelivers webhooks; the same write again is a no-op
    repo.update_status(order.id, OrderStatus::Paid).await.unwrap();

    let stored = repo.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn conflicting_status_write_is_rejected() {
    let pool = connect().await;
    let repo = OrderRepository::new(&pool);
    let order = repo.insert(&draft()).await.unwrap();

    repo.update_status(order.id, OrderStatus::Cancelled).await.unwrap();

    // A late "paid" after cancellation must not overwrite
    let result = repo.update_status(order.id, OrderStatus::Paid).await;
    assert!(matches!(
        result,
        Err(RepositoryError::IllegalTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Paid,
        })
    ));

    let stored = repo.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn status_write_for_unknown_order_is_not_found() {
    let pool = connect().await;
    let repo = OrderRepository::new(&pool);

    let result = repo.update_status(OrderId::generate(), OrderStatus::Paid).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}
