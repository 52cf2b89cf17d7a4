use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BoatId, BookingId, PaymentId, UserId};
use domain::{
    AvailabilityWindow, Boat, Booking, BookingStatus, Money, Payment, PaymentMethod,
    PaymentStatus, User,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{AvailabilityStore, BoatStore, BookingStore, PaymentStore, UserStore},
};

/// The exclusion constraint that rejects overlapping non-cancelled
/// bookings for the same boat. Violations surface as [`StoreError::Conflict`].
const BOOKING_OVERLAP_CONSTRAINT: &str = "bookings_no_overlap";

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_window(row: PgRow) -> Result<AvailabilityWindow> {
        Ok(AvailabilityWindow::from_parts(
            row.try_get::<Uuid, _>("id")?,
            BoatId::from_uuid(row.try_get::<Uuid, _>("boat_id")?),
            row.try_get("start_time")?,
            row.try_get("end_time")?,
            Money::from_cents(row.try_get("price_per_hour_cents")?),
        ))
    }

    fn row_to_booking(row: PgRow) -> Result<Booking> {
        let status: String = row.try_get("status")?;
        let status: BookingStatus = status.parse().map_err(StoreError::Decode)?;

        Ok(Booking::from_parts(
            BookingId::from_uuid(row.try_get::<Uuid, _>("id")?),
            UserId::from_uuid(row.try_get::<Uuid, _>("renter_id")?),
            BoatId::from_uuid(row.try_get::<Uuid, _>("boat_id")?),
            row.try_get("start_time")?,
            row.try_get("end_time")?,
            status,
            Money::from_cents(row.try_get("total_price_cents")?),
        ))
    }

    fn row_to_payment(row: PgRow) -> Result<Payment> {
        let status: String = row.try_get("status")?;
        let status: PaymentStatus = status.parse().map_err(StoreError::Decode)?;
        let method: String = row.try_get("method")?;
        let method: PaymentMethod = method.parse().map_err(StoreError::Decode)?;

        Ok(Payment::from_parts(
            PaymentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            BookingId::from_uuid(row.try_get::<Uuid, _>("booking_id")?),
            Money::from_cents(row.try_get("amount_cents")?),
            method,
            status,
            row.try_get("transaction_id")?,
            row.try_get("gateway_message")?,
            row.try_get("processed_at")?,
            row.try_get("created_at")?,
        ))
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User::new(
            UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<String, _>("email")?,
            row.try_get::<String, _>("name")?,
        ))
    }

    fn row_to_boat(row: PgRow) -> Result<Boat> {
        Ok(Boat::new(
            BoatId::from_uuid(row.try_get::<Uuid, _>("id")?),
            UserId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
            row.try_get::<String, _>("name")?,
        ))
    }
}

#[async_trait]
impl AvailabilityStore for PostgresStore {
    async fn add_window(&self, window: &AvailabilityWindow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO availability_windows (id, boat_id, start_time, end_time, price_per_hour_cents)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(window.id())
        .bind(window.boat().as_uuid())
        .bind(window.start_time())
        .bind(window.end_time())
        .bind(window.price_per_hour().cents())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn windows_overlapping(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityWindow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, boat_id, start_time, end_time, price_per_hour_cents
            FROM availability_windows
            WHERE boat_id = $1 AND start_time < $3 AND $2 < end_time
            ORDER BY start_time ASC
            "#,
        )
        .bind(boat.as_uuid())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_window).collect()
    }
}

#[async_trait]
impl BookingStore for PostgresStore {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, renter_id, boat_id, start_time, end_time, status, total_price_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id().as_uuid())
        .bind(booking.renter().as_uuid())
        .bind(booking.boat().as_uuid())
        .bind(booking.start_time())
        .bind(booking.end_time())
        .bind(booking.status().as_str())
        .bind(booking.total_price().cents())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(BOOKING_OVERLAP_CONSTRAINT)
            {
                return StoreError::Conflict {
                    boat: booking.boat(),
                };
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, total_price_cents = $3
            WHERE id = $1
            "#,
        )
        .bind(booking.id().as_uuid())
        .bind(booking.status().as_str())
        .bind(booking.total_price().cents())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn find(&self, id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, renter_id, boat_id, start_time, end_time, status, total_price_cents
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_booking).transpose()
    }

    async fn find_conflicting(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT id, renter_id, boat_id, start_time, end_time, status, total_price_cents
            FROM bookings
            WHERE boat_id = $1 AND status <> 'Cancelled' AND start_time < $3 AND $2 < end_time
            ORDER BY start_time ASC
            "#,
        )
        .bind(boat.as_uuid())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn list_for_renter(&self, renter: UserId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT id, renter_id, boat_id, start_time, end_time, status, total_price_cents
            FROM bookings
            WHERE renter_id = $1
            ORDER BY start_time DESC
            "#,
        )
        .bind(renter.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }
}

#[async_trait]
impl PaymentStore for PostgresStore {
    async fn insert(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, booking_id, amount_cents, method, status,
                                  transaction_id, gateway_message, processed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id().as_uuid())
        .bind(payment.booking().as_uuid())
        .bind(payment.amount().cents())
        .bind(payment.method().as_str())
        .bind(payment.status().as_str())
        .bind(payment.transaction_id())
        .bind(payment.gateway_message())
        .bind(payment.processed_at())
        .bind(payment.created_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, transaction_id = $3, gateway_message = $4, processed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(payment.id().as_uuid())
        .bind(payment.status().as_str())
        .bind(payment.transaction_id())
        .bind(payment.gateway_message())
        .bind(payment.processed_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, booking_id, amount_cents, method, status,
                   transaction_id, gateway_message, processed_at, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }

    async fn find_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, booking_id, amount_cents, method, status,
                   transaction_id, gateway_message, processed_at, created_at
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }

    async fn list_for_booking(&self, booking: BookingId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, booking_id, amount_cents, method, status,
                   transaction_id, gateway_message, processed_at, created_at
            FROM payments
            WHERE booking_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(booking.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn add(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email, name FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl BoatStore for PostgresStore {
    async fn add(&self, boat: &Boat) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO boats (id, owner_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(boat.id.as_uuid())
        .bind(boat.owner.as_uuid())
        .bind(&boat.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: BoatId) -> Result<Option<Boat>> {
        let row = sqlx::query("SELECT id, owner_id, name FROM boats WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_boat).transpose()
    }
}
