use crate::curation::CurationStatus;
use crate::models::{Resource, ResourcePage, ResourceQuery, ResourceRequest, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers talk to the
/// data layer without knowing the implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's
/// asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Health ---
    async fn ping(&self) -> bool;

    // --- User/Auth ---
    async fn get_user(&self, id: Uuid) -> Option<User>;

    // --- Resource Retrieval ---
    // Filtered, paginated listing. The caller decides the status filter.
    async fn list_resources(&self, query: ResourceQuery) -> ResourcePage;
    // Any resource by ID, regardless of status. For ownership checks and admin use.
    async fn get_resource(&self, id: Uuid) -> Option<Resource>;
    // Only returns the resource if its status is Approved.
    async fn get_public_resource(&self, id: Uuid) -> Option<Resource>;
    async fn get_my_resources(&self, creator_id: Uuid) -> Vec<Resource>;

    // --- Resource Actions ---
    // The status is the curation verdict computed by the caller.
    async fn create_resource(
        &self,
        req: ResourceRequest,
        creator_id: Uuid,
        status: CurationStatus,
    ) -> Option<Resource>;
    // Owner-Only: updates only if creator_id matches.
    async fn update_resource(
        &self,
        id: Uuid,
        creator_id: Uuid,
        req: ResourceRequest,
        status: CurationStatus,
    ) -> Option<Resource>;
    // Owner-Only: deletes only if creator_id matches.
    async fn delete_resource(&self, id: Uuid, creator_id: Uuid) -> bool;
    // Admin action: manual moderation override.
    async fn set_resource_status(&self, id: Uuid, status: CurationStatus) -> Option<Resource>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are checked at runtime so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the WHERE clause shared by the count and page queries.
fn push_resource_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ResourceQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(status) = query.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }

    // Descriptive filters match case-insensitively.
    let text_filters = [
        ("theme", &query.theme),
        ("level", &query.level),
        ("language", &query.language),
        ("format", &query.format),
    ];
    for (column, value) in text_filters {
        if let Some(value) = value {
            builder.push(format!(" AND LOWER({}) = LOWER(", column));
            builder.push_bind(value.clone());
            builder.push(")");
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// ping
    ///
    /// `SELECT 1` round trip used by the health endpoint.
    async fn ping(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("ping error: {:?}", e);
                false
            }
        }
    }

    /// get_user
    ///
    /// Retrieves the profile (id, name, email, role) needed for authentication and RBAC.
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, name, email, role FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    /// list_resources
    ///
    /// Flexible filtering with QueryBuilder for safe parameterization. Runs a COUNT over the
    /// same filters so the page carries the total.
    async fn list_resources(&self, query: ResourceQuery) -> ResourcePage {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM resources");
        push_resource_filters(&mut count_builder, &query);

        let count = match count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::error!("list_resources count error: {:?}", e);
                0
            }
        };

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT id, creator_id, title, content, language, format, theme, level,
                   status, created_at, updated_at
            FROM resources
            "#,
        );
        push_resource_filters(&mut builder, &query);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        let data = match builder.build_query_as::<Resource>().fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("list_resources error: {:?}", e);
                vec![]
            }
        };

        ResourcePage {
            data,
            count,
            limit: query.limit,
            offset: query.offset,
        }
    }

    /// get_resource
    ///
    /// Retrieval of any resource by ID (no visibility check).
    async fn get_resource(&self, id: Uuid) -> Option<Resource> {
        sqlx::query_as::<_, Resource>(
            r#"SELECT id, creator_id, title, content, language, format, theme, level,
                      status, created_at, updated_at
                FROM resources
                WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_resource error: {:?}", e);
            None
        })
    }

    /// get_public_resource
    ///
    /// Retrieves a resource *only* if curation approved it.
    async fn get_public_resource(&self, id: Uuid) -> Option<Resource> {
        sqlx::query_as::<_, Resource>(
            r#"SELECT id, creator_id, title, content, language, format, theme, level,
                      status, created_at, updated_at
                FROM resources
                WHERE id = $1 AND status = $2"#,
        )
        .bind(id)
        .bind(CurationStatus::Approved.as_str())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_public_resource error: {:?}", e);
            None
        })
    }

    /// get_my_resources
    ///
    /// All resources owned by the user, including Pending and Rejected ones.
    async fn get_my_resources(&self, creator_id: Uuid) -> Vec<Resource> {
        match sqlx::query_as::<_, Resource>(
            r#"SELECT id, creator_id, title, content, language, format, theme, level,
                      status, created_at, updated_at
                FROM resources
                WHERE creator_id = $1
                ORDER BY created_at DESC"#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("get_my_resources error: {:?}", e);
                vec![]
            }
        }
    }

    /// create_resource
    ///
    /// Inserts a new resource carrying the curation verdict as its initial status.
    async fn create_resource(
        &self,
        req: ResourceRequest,
        creator_id: Uuid,
        status: CurationStatus,
    ) -> Option<Resource> {
        sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (id, creator_id, title, content, language, format, theme, level, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, creator_id, title, content, language, format, theme, level,
                      status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(creator_id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.language)
        .bind(req.format)
        .bind(req.theme)
        .bind(req.level)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tracing::error!("create_resource error: {:?}", e))
        .ok()
    }

    /// update_resource
    ///
    /// Replaces the editable fields and the status, only if `creator_id` matches the owner.
    async fn update_resource(
        &self,
        id: Uuid,
        creator_id: Uuid,
        req: ResourceRequest,
        status: CurationStatus,
    ) -> Option<Resource> {
        sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET title = $3,
                content = $4,
                language = $5,
                format = $6,
                theme = $7,
                level = $8,
                status = $9,
                updated_at = NOW()
            WHERE id = $1 AND creator_id = $2
            RETURNING id, creator_id, title, content, language, format, theme, level,
                      status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(creator_id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.language)
        .bind(req.format)
        .bind(req.theme)
        .bind(req.level)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_resource error: {:?}", e);
            None
        })
    }

    /// delete_resource
    ///
    /// **Owner-Only** delete.
    async fn delete_resource(&self, id: Uuid, creator_id: Uuid) -> bool {
        match sqlx::query("DELETE FROM resources WHERE id = $1 AND creator_id = $2")
            .bind(id)
            .bind(creator_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_resource error: {:?}", e);
                false
            }
        }
    }

    /// set_resource_status
    ///
    /// Admin override of the curation verdict, e.g. approving an item left Pending.
    async fn set_resource_status(&self, id: Uuid, status: CurationStatus) -> Option<Resource> {
        sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, creator_id, title, content, language, format, theme, level,
                      status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_resource_status error: {:?}", e);
            None
        })
    }
}
