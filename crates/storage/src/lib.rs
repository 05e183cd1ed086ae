use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::{
    domain::{ArtworkId, ArtworkRecord, PipelineStatus, ProfileSummary, UserId},
    protocol::{ArtworkFields, ArtworkFilter, ArtworkPatch},
};

const ARTWORK_COLUMNS: &str =
    "id, user_id, title, medium, price, due_date, description, image_url, status, created_at, updated_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Each in-memory connection is its own database.
        let max_connections = if database_url.starts_with("sqlite::memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Returns the existing profile when the display name is already taken.
    pub async fn create_profile(&self, display_name: &str) -> Result<ProfileSummary> {
        let row = sqlx::query(
            "INSERT INTO profiles (display_name, created_at) VALUES (?, ?)
             ON CONFLICT(display_name) DO UPDATE SET display_name=excluded.display_name
             RETURNING id, display_name, created_at",
        )
        .bind(display_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(profile_from_row(&row))
    }

    pub async fn load_profile(&self, user_id: UserId) -> Result<Option<ProfileSummary>> {
        let row = sqlx::query("SELECT id, display_name, created_at FROM profiles WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(profile_from_row))
    }

    pub async fn insert_artwork(
        &self,
        user_id: UserId,
        fields: &ArtworkFields,
    ) -> Result<ArtworkRecord> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO artworks (user_id, title, medium, price, due_date, description, image_url, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {ARTWORK_COLUMNS}"
        ))
        .bind(user_id.0)
        .bind(&fields.title)
        .bind(&fields.medium)
        .bind(fields.price)
        .bind(fields.due_date)
        .bind(fields.description.as_deref())
        .bind(fields.image_url.as_deref())
        .bind(fields.status.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to insert artwork for user {}", user_id.0))?;
        artwork_from_row(&row)
    }

    pub async fn load_artwork(&self, artwork_id: ArtworkId) -> Result<Option<ArtworkRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks WHERE id = ?"
        ))
        .bind(artwork_id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(artwork_from_row).transpose()
    }

    /// Artworks for one user in creation order, optionally narrowed to one status.
    pub async fn list_artworks_for_user(
        &self,
        user_id: UserId,
        filter: &ArtworkFilter,
        limit: u32,
    ) -> Result<Vec<ArtworkRecord>> {
        let rows = if let Some(status) = filter.status {
            sqlx::query(&format!(
                "SELECT {ARTWORK_COLUMNS}
                 FROM artworks
                 WHERE user_id = ? AND status = ?
                 ORDER BY id ASC
                 LIMIT ?"
            ))
            .bind(user_id.0)
            .bind(status.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                "SELECT {ARTWORK_COLUMNS}
                 FROM artworks
                 WHERE user_id = ?
                 ORDER BY id ASC
                 LIMIT ?"
            ))
            .bind(user_id.0)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(artwork_from_row).collect()
    }

    pub async fn update_artwork(
        &self,
        artwork_id: ArtworkId,
        patch: &ArtworkPatch,
    ) -> Result<Option<ArtworkRecord>> {
        let row = sqlx::query(&format!(
            "UPDATE artworks SET
                title = COALESCE(?, title),
                medium = COALESCE(?, medium),
                price = CASE WHEN ? THEN ? ELSE price END,
                due_date = CASE WHEN ? THEN ? ELSE due_date END,
                description = CASE WHEN ? THEN ? ELSE description END,
                image_url = CASE WHEN ? THEN ? ELSE image_url END,
                status = COALESCE(?, status),
                updated_at = ?
             WHERE id = ?
             RETURNING {ARTWORK_COLUMNS}"
        ))
        .bind(patch.title.as_deref())
        .bind(patch.medium.as_deref())
        // Nullable columns: (touched, new value), where a touched NULL clears.
        .bind(patch.price.is_some())
        .bind(patch.price.flatten())
        .bind(patch.due_date.is_some())
        .bind(patch.due_date.flatten())
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.image_url.is_some())
        .bind(patch.image_url.clone().flatten())
        .bind(patch.status.map(PipelineStatus::as_str))
        .bind(Utc::now())
        .bind(artwork_id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(artwork_from_row).transpose()
    }

    /// Returns false when no artwork has the given id.
    pub async fn update_artwork_status(
        &self,
        artwork_id: ArtworkId,
        status: PipelineStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE artworks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(artwork_id.0)
            .execute(&self.pool)
            .await?;
        debug!(artwork_id = artwork_id.0, %status, rows = result.rows_affected(), "artwork status updated");
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_artwork(&self, artwork_id: ArtworkId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artworks WHERE id = ?")
            .bind(artwork_id.0)
            .execute(&self.pool)
            .await?;
        debug!(artwork_id = artwork_id.0, rows = result.rows_affected(), "artwork deleted");
        Ok(result.rows_affected() > 0)
    }

    pub async fn status_counts(&self, user_id: UserId) -> Result<HashMap<PipelineStatus, i64>> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) FROM artworks WHERE user_id = ? GROUP BY status",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut counts: HashMap<PipelineStatus, i64> =
            PipelineStatus::ALL.iter().map(|status| (*status, 0)).collect();
        for row in rows {
            let status = parse_status(&row.get::<String, _>(0))?;
            counts.insert(status, row.get::<i64, _>(1));
        }
        Ok(counts)
    }
}

fn profile_from_row(row: &SqliteRow) -> ProfileSummary {
    ProfileSummary {
        user_id: UserId(row.get::<i64, _>(0)),
        display_name: row.get::<String, _>(1),
        created_at: row.get::<DateTime<Utc>, _>(2),
    }
}

fn artwork_from_row(row: &SqliteRow) -> Result<ArtworkRecord> {
    Ok(ArtworkRecord {
        id: ArtworkId(row.get::<i64, _>("id")),
        user_id: UserId(row.get::<i64, _>("user_id")),
        title: row.get::<String, _>("title"),
        medium: row.get::<String, _>("medium"),
        price: row.get::<Option<f64>, _>("price"),
        due_date: row.get::<Option<NaiveDate>, _>("due_date"),
        description: row.get::<Option<String>, _>("description"),
        image_url: row.get::<Option<String>, _>("image_url"),
        status: parse_status(&row.get::<String, _>("status"))?,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

fn parse_status(raw: &str) -> Result<PipelineStatus> {
    raw.parse::<PipelineStatus>()
        .map_err(|err| anyhow!("corrupt artwork row: {err}"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
