use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;

/// A persisted blog post, created exactly once per successful pipeline run
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BlogPost {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub source_title: String,
    pub source_link: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a blog post before it has been inserted
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub owner_id: Uuid,
    pub source_title: String,
    pub source_link: String,
    pub content: String,
}

/// Persistence seam for the pipeline and the read handlers, mockable in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert one post atomically and return the stored row
    async fn insert(&self, post: NewBlogPost) -> Result<BlogPost, sqlx::Error>;

    /// All posts belonging to one owner, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BlogPost>, sqlx::Error>;

    /// One post by id, regardless of owner. Callers enforce ownership.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, sqlx::Error>;
}

/// Blog post repository over a Postgres pool
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn insert(&self, post: NewBlogPost) -> Result<BlogPost, sqlx::Error> {
        sqlx::query_as::<Postgres, BlogPost>(
            "INSERT INTO blog_posts (id, owner_id, source_title, source_link, content, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, owner_id, source_title, source_link, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(post.owner_id)
        .bind(&post.source_title)
        .bind(&post.source_link)
        .bind(&post.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BlogPost>, sqlx::Error> {
        sqlx::query_as::<Postgres, BlogPost>(
            "SELECT id, owner_id, source_title, source_link, content, created_at
             FROM blog_posts
             WHERE owner_id = $1
             ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, sqlx::Error> {
        sqlx::query_as::<Postgres, BlogPost>(
            "SELECT id, owner_id, source_title, source_link, content, created_at
             FROM blog_posts
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Connect to Postgres and run pending migrations
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
