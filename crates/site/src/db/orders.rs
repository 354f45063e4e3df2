//! Order repository for database operations.
//!
//! A thin data-access layer over the `orders` table. Status writes are
//! checked against the order status machine here, at the storage boundary,
//! so no caller can overwrite a status with a value the current state does
//! not allow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use lemongrass_core::{
    Email, LineItem, Order, OrderDraft, OrderId, OrderStatus, OrderType, StatusWrite,
};

use super::RepositoryError;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

/// One `orders` row as it comes off the wire.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: i32,
    order_type: OrderType,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    customer_address: Option<String>,
    items: Json<Vec<LineItem>>,
    subtotal: Decimal,
    total: Decimal,
    status: OrderStatus,
    payment_reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let customer_email = row
            .customer_email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            order_number: row.order_number,
            order_type: row.order_type,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_email,
            customer_address: row.customer_address,
            items: row.items.0,
            subtotal: row.subtotal,
            total: row.total,
            status: row.status,
            payment_reference: row.payment_reference,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a validated order with status `pending`.
    ///
    /// Returns the stored order, including the display number and
    /// timestamps assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let row: (i32, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO orders
                (id, type, customer_name, customer_phone, customer_email,
                 customer_address, items, subtotal, total, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING order_number, created_at, updated_at
            ",
        )
        .bind(draft.id)
        .bind(draft.order_type)
        .bind(&draft.customer_name)
        .bind(&draft.customer_phone)
        .bind(draft.customer_email.as_ref().map(Email::as_str))
        .bind(draft.customer_address.as_deref())
        .bind(Json(&draft.items))
        .bind(draft.subtotal)
        .bind(draft.total)
        .bind(OrderStatus::Pending)
        .bind(draft.notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(Order {
            id: draft.id,
            order_number: row.0,
            order_type: draft.order_type,
            customer_name: draft.customer_name.clone(),
            customer_phone: draft.customer_phone.clone(),
            customer_email: draft.customer_email.clone(),
            customer_address: draft.customer_address.clone(),
            items: draft.items.clone(),
            subtotal: draft.subtotal,
            total: draft.total,
            status: OrderStatus::Pending,
            payment_reference: None,
            notes: draft.notes.clone(),
            created_at: row.1,
            updated_at: row.2,
        })
    }

    /// Get an order by its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, order_number, type AS order_type, customer_name,
                   customer_phone, customer_email, customer_address, items,
                   subtotal, total, status, payment_reference, notes,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Move an order to a new status.
    ///
    /// The write only succeeds when the order currently holds the status
    /// the machine requires before `to` (see `OrderStatus::predecessor`).
    /// Re-applying the status an order already holds is an idempotent
    /// no-op, which is what a redelivered payment webhook produces.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::IllegalTransition` if the current status
    /// does not allow the write.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        if let Some(from) = to.predecessor() {
            let result = sqlx::query(
                r"
                UPDATE orders
                SET status = $2, updated_at = now()
                WHERE id = $1 AND status = $3
                ",
            )
            .bind(id)
            .bind(to)
            .bind(from)
            .execute(self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(());
            }
        }

        // The conditional write matched nothing (or the target was pending,
        // which is only ever set at insert). The current status decides
        // between a redundant redelivery and an illegal write.
        let current = self.current_status(id).await?;
        match current.classify_write(to) {
            StatusWrite::AlreadyApplied => Ok(()),
            // A legal-looking current status here means the row changed
            // between the two queries; surface the conflict rather than
            // retrying.
            StatusWrite::Apply | StatusWrite::Illegal => {
                Err(RepositoryError::IllegalTransition { from: current, to })
            }
        }
    }

    /// Attach the payment provider's session id to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_payment_reference(
        &self,
        id: OrderId,
        reference: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET payment_reference = $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(reference)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Fetch just the status of an order, for transition diagnostics.
    async fn current_status(&self, id: OrderId) -> Result<OrderStatus, RepositoryError> {
        let row: Option<(OrderStatus,)> =
            sqlx::query_as("SELECT status FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(|(status,)| status).ok_or(RepositoryError::NotFound)
    }
}
