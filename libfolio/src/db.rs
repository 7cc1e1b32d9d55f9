//! Database operations for Folio
//!
//! Pages are stored in a single SQLite table. Components are kept as a JSON
//! array and timestamps as Unix microseconds, so a page read back compares
//! equal to the page that was written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;

use crate::error::{DbError, Result};
use crate::source::PageSource;
use crate::types::{CmsPage, PageComponent, PageStatus};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
        }

        // mode=rwc creates the file on first use
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        tracing::debug!("Opened page database at {}", expanded_path);

        Ok(Self { pool })
    }

    /// Insert a page, or replace every column of an existing page with the same id
    pub async fn save_page(&self, page: &CmsPage) -> Result<()> {
        let components = serde_json::to_string(&page.components).map_err(|e| {
            DbError::CorruptRow {
                id: page.id.clone(),
                reason: format!("components not serializable: {}", e),
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO pages (id, title, slug, description, status, components, created_at, updated_at, published_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                slug = excluded.slug,
                description = excluded.description,
                status = excluded.status,
                components = excluded.components,
                updated_at = excluded.updated_at,
                published_at = excluded.published_at
            "#,
        )
        .bind(&page.id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.description)
        .bind(page.status.as_str())
        .bind(components)
        .bind(page.created_at.timestamp_micros())
        .bind(page.updated_at.timestamp_micros())
        .bind(page.published_at.map(|t| t.timestamp_micros()))
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Get a page by ID
    pub async fn get_page(&self, page_id: &str) -> Result<Option<CmsPage>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, description, status, components, created_at, updated_at, published_at
            FROM pages WHERE id = ?
            "#,
        )
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        row.map(|r| page_from_row(&r)).transpose()
    }

    /// All pages, in the order they were first inserted
    pub async fn list_pages(&self) -> Result<Vec<CmsPage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, description, status, components, created_at, updated_at, published_at
            FROM pages ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.iter().map(page_from_row).collect()
    }

    /// Delete a page; returns whether a row was removed
    pub async fn remove_page(&self, page_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of pages with the given status
    pub async fn count_by_status(&self, status: PageStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM pages WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(row.get("count"))
    }
}

#[async_trait]
impl PageSource for Database {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn fetch_pages(&self) -> Result<Vec<CmsPage>> {
        self.list_pages().await
    }

    async fn upsert_page(&self, page: &CmsPage) -> Result<()> {
        self.save_page(page).await
    }

    async fn delete_page(&self, page_id: &str) -> Result<()> {
        self.remove_page(page_id).await.map(|_| ())
    }
}

fn page_from_row(row: &SqliteRow) -> Result<CmsPage> {
    let id: String = row.get("id");

    let corrupt = |reason: String| DbError::CorruptRow {
        id: id.clone(),
        reason,
    };

    let status = row
        .get::<String, _>("status")
        .parse::<PageStatus>()
        .map_err(corrupt)?;

    let components: Vec<PageComponent> =
        serde_json::from_str(&row.get::<String, _>("components"))
            .map_err(|e| corrupt(format!("invalid components JSON: {}", e)))?;

    let created_at = timestamp(row.get("created_at"))
        .ok_or_else(|| corrupt("invalid created_at".to_string()))?;
    let updated_at = timestamp(row.get("updated_at"))
        .ok_or_else(|| corrupt("invalid updated_at".to_string()))?;
    let published_at = match row.get::<Option<i64>, _>("published_at") {
        Some(micros) => {
            Some(timestamp(micros).ok_or_else(|| corrupt("invalid published_at".to_string()))?)
        }
        None => None,
    };

    Ok(CmsPage {
        id: id.clone(),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        status,
        components,
        created_at,
        updated_at,
        published_at,
    })
}

fn timestamp(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}
