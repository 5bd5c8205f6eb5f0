//! Repository for the `policies` table.

use policydesk_core::followup::FOLLOWUP_NONE;
use policydesk_core::types::{CalendarDate, DbId};
use sqlx::PgPool;

use crate::models::policy::{CreatePolicy, Policy, PolicyFilter, UpdatePolicy};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, plate, owner, contact, company, start_date, expiry_date, \
                       followup_status, renewed_date, created_at, updated_at";

/// `WHERE` clause shared by filtered listings; binds `$1..$4`.
const FILTER: &str = "($1::text IS NULL OR lower(company) = lower($1))
      AND ($2::date IS NULL OR expiry_date > $2)
      AND ($3::date IS NULL OR expiry_date <= $3)
      AND ($4::text IS NULL
           OR strpos(lower(plate), lower($4)) > 0
           OR strpos(lower(owner), lower($4)) > 0
           OR strpos(lower(contact), lower($4)) > 0)";

/// Provides CRUD and lifecycle operations for policies.
pub struct PolicyRepo;

impl PolicyRepo {
    /// Insert a new policy, returning the created row.
    ///
    /// A duplicate plate violates `uq_policies_plate`.
    pub async fn create(pool: &PgPool, input: &CreatePolicy) -> Result<Policy, sqlx::Error> {
        let query = format!(
            "INSERT INTO policies (plate, owner, contact, company, start_date, expiry_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Policy>(&query)
            .bind(&input.plate)
            .bind(&input.owner)
            .bind(&input.contact)
            .bind(&input.company)
            .bind(input.start_date)
            .bind(input.expiry_date)
            .fetch_one(pool)
            .await
    }

    /// Find a policy by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Policy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM policies WHERE id = $1");
        sqlx::query_as::<_, Policy>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a page of policies matching `filter`, soonest expiry first.
    pub async fn list(
        pool: &PgPool,
        filter: &PolicyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Policy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM policies
             WHERE {FILTER}
             ORDER BY expiry_date ASC, id ASC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Policy>(&query)
            .bind(&filter.company)
            .bind(filter.expires_after)
            .bind(filter.expires_until)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every policy matching `filter`, unpaginated. Feeds exports and reports.
    pub async fn list_all(pool: &PgPool, filter: &PolicyFilter) -> Result<Vec<Policy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM policies
             WHERE {FILTER}
             ORDER BY expiry_date ASC, id ASC"
        );
        sqlx::query_as::<_, Policy>(&query)
            .bind(&filter.company)
            .bind(filter.expires_after)
            .bind(filter.expires_until)
            .bind(&filter.search)
            .fetch_all(pool)
            .await
    }

    /// Update a policy. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePolicy,
    ) -> Result<Option<Policy>, sqlx::Error> {
        let query = format!(
            "UPDATE policies SET
                plate = COALESCE($2, plate),
                owner = COALESCE($3, owner),
                contact = COALESCE($4, contact),
                company = COALESCE($5, company),
                start_date = COALESCE($6, start_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Policy>(&query)
            .bind(id)
            .bind(&input.plate)
            .bind(&input.owner)
            .bind(&input.contact)
            .bind(&input.company)
            .bind(input.start_date)
            .fetch_optional(pool)
            .await
    }

    /// Record a renewal on a policy that is still expired as of `today`.
    ///
    /// The expiry guard makes concurrent renewals race safely: only the
    /// first one matches. Returns `None` if the row is gone or no longer
    /// expired.
    pub async fn renew(
        pool: &PgPool,
        id: DbId,
        new_expiry: CalendarDate,
        today: CalendarDate,
    ) -> Result<Option<Policy>, sqlx::Error> {
        let query = format!(
            "UPDATE policies SET expiry_date = $2, renewed_date = $3
             WHERE id = $1 AND expiry_date < $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Policy>(&query)
            .bind(id)
            .bind(new_expiry)
            .bind(today)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the follow-up status (last write wins).
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_followup(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Policy>, sqlx::Error> {
        let query = format!(
            "UPDATE policies SET followup_status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Policy>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Reset the follow-up status to `none`.
    pub async fn clear_followup(pool: &PgPool, id: DbId) -> Result<Option<Policy>, sqlx::Error> {
        Self::set_followup(pool, id, FOLLOWUP_NONE).await
    }

    /// Permanently delete a policy by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM policies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
