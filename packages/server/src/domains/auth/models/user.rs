use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

/// User - SQL persistence layer
///
/// One row per mobile number; the row is the durable identity anchor and is
/// never deleted by the auth core. `otp` and `otp_expires_at` are set
/// together while a code is outstanding and cleared together on
/// verification or expiry.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub mobile_number: String,

    // Never serialized into API responses
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,

    pub is_verified: bool,

    // Profile fields, mutated by profile-update flows only
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields accepted by the update flow. `None` leaves a column as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl User {
    /// Find user by id
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by mobile number
    pub async fn find_by_mobile(mobile_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE mobile_number = $1")
            .bind(mobile_number)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by mobile number, locking the row for the enclosing
    /// transaction. Both issuance and verification lock before mutating so
    /// concurrent requests for the same number serialize at the row.
    pub async fn find_by_mobile_for_update(
        mobile_number: &str,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE mobile_number = $1 FOR UPDATE")
            .bind(mobile_number)
            .fetch_optional(conn)
            .await
    }

    /// Create a row for a previously-unseen mobile number with an
    /// outstanding code. New accounts start unverified.
    ///
    /// A concurrent issuance can insert the row between our locking read
    /// and this statement; the conflict clause turns that race into the
    /// update path (last write wins) instead of a unique-violation error.
    pub async fn upsert_otp(
        mobile_number: &str,
        otp: &str,
        otp_expires_at: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (mobile_number, otp, otp_expires_at, is_verified)
            VALUES ($1, $2, $3, FALSE)
            ON CONFLICT (mobile_number) DO UPDATE
            SET otp = EXCLUDED.otp,
                otp_expires_at = EXCLUDED.otp_expires_at,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(mobile_number)
        .bind(otp)
        .bind(otp_expires_at)
        .fetch_one(conn)
        .await
    }

    /// Overwrite the outstanding code in place, discarding any prior one.
    pub async fn set_otp(
        id: i64,
        otp: &str,
        otp_expires_at: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET otp = $2, otp_expires_at = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(otp)
        .bind(otp_expires_at)
        .fetch_one(conn)
        .await
    }

    /// Clear the outstanding code without touching `is_verified`.
    /// Used when an expired code is presented: expired codes cannot be
    /// retried.
    pub async fn clear_otp(id: i64, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET otp = NULL, otp_expires_at = NULL, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await
    }

    /// Successful verification: flip the flag and consume the code in one
    /// statement.
    pub async fn mark_verified(id: i64, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET is_verified = TRUE, otp = NULL, otp_expires_at = NULL, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await
    }

    /// Apply a profile update, leaving unset fields untouched. Never
    /// touches the OTP columns or `is_verified`.
    pub async fn update_profile(id: i64, update: ProfileUpdate, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET name          = COALESCE($2, name),
                address_line1 = COALESCE($3, address_line1),
                address_line2 = COALESCE($4, address_line2),
                city          = COALESCE($5, city),
                state         = COALESCE($6, state),
                pincode       = COALESCE($7, pincode),
                updated_at    = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.address_line1)
        .bind(update.address_line2)
        .bind(update.city)
        .bind(update.state)
        .bind(update.pincode)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
