use async_trait::async_trait;
use category_commands::{CreateCategoryCommand, UpdateCategoryCommand};
use category_errors::CategoryError;
use category_models::Category;
use dao_utils::pagination::{PaginationParams, create_param_refs};
use database_traits::dao::GenericDao;
use sql_connection::SqlConnect;
use tokio_postgres::error::SqlState;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct CategoryDao {
    db: SqlConnect,
}

impl CategoryDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    #[instrument(skip_all)]
    pub async fn find_with_pagination(
        &self, limit: Option<u64>, offset: Option<u64>,
    ) -> Result<Vec<Category>, CategoryError> {
        let client = self.db.get_read_client().await?;
        let pagination = PaginationParams::new(limit, offset);
        let (sql, params) = pagination.build_query_parts(
            "SELECT id, name, description FROM category",
            "ORDER BY name ASC",
        );

        let stmt = client.prepare(&sql).await?;
        let param_refs = create_param_refs(&params);
        let rows = client.query(&stmt, &param_refs).await?;

        Ok(rows.iter().map(|row| self.map_row(row)).collect())
    }
}

#[async_trait]
impl GenericDao for CategoryDao {
    type CreateRequest = CreateCategoryCommand;
    type Error = CategoryError;
    type ID = Uuid;
    type Model = Category;
    type Response = Category;
    type UpdateRequest = UpdateCategoryCommand;

    async fn find_by_id(
        &self, id: Self::ID,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id, name, description FROM category WHERE id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(CategoryError::NotFound { category_id: id })
    }

    async fn all(&self) -> Result<Vec<Self::Response>, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id, name, description FROM category ORDER BY name \
                 ASC",
            )
            .await?;
        let rows = client.query(&stmt, &[]).await?;

        Ok(rows.iter().map(|row| self.map_row(row)).collect())
    }

    async fn create(
        &self, req: Self::CreateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_client().await?;
        let id = Uuid::now_v7();

        let stmt = client
            .prepare(
                "INSERT INTO category (id, name, description) VALUES ($1, \
                 $2, $3) RETURNING id, name, description",
            )
            .await?;
        let rows = client
            .query(&stmt, &[&id, &req.name, &req.description])
            .await
            .map_err(unique_violation_to_exists)?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(CategoryError::NotFound { category_id: id })
    }

    async fn update(
        &self, id: Self::ID, req: Self::UpdateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare(
                "UPDATE category SET name = COALESCE($1, name), description \
                 = COALESCE($2, description) WHERE id = $3 RETURNING id, \
                 name, description",
            )
            .await?;
        let rows = client
            .query(&stmt, &[&req.name, &req.description, &id])
            .await
            .map_err(unique_violation_to_exists)?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(CategoryError::NotFound { category_id: id })
    }

    async fn delete(&self, id: Self::ID) -> Result<(), Self::Error> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("DELETE FROM category WHERE id = $1")
            .await?;
        let deleted = client.execute(&stmt, &[&id]).await?;

        if deleted == 0 {
            return Err(CategoryError::NotFound { category_id: id });
        }

        Ok(())
    }

    fn map_row(&self, row: &tokio_postgres::Row) -> Self::Model {
        Category {
            id: row.get(0),
            name: row.get(1),
            description: row.get(2),
        }
    }
}

fn unique_violation_to_exists(err: tokio_postgres::Error) -> CategoryError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        CategoryError::NameExists
    }
    else {
        CategoryError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use category_commands::{CreateCategoryCommand, UpdateCategoryCommand};
    use database_traits::dao::GenericDao;
    use test_utils::*;

    use crate::{CategoryDao, CategoryError};

    fn hotels() -> CreateCategoryCommand {
        CreateCategoryCommand {
            name: "Hotels".to_string(),
            description: "Hotel listings".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_category() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = CategoryDao::new(create_sql_connect(&container));

        let created = dao.create(hotels()).await.unwrap();
        let found = dao.find_by_id(created.id).await.unwrap();
        assert_eq!(found.name, "Hotels");
    }

    #[tokio::test]
    async fn test_duplicate_name_fails() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = CategoryDao::new(create_sql_connect(&container));

        dao.create(hotels()).await.unwrap();
        let result = dao
            .create(CreateCategoryCommand {
                name: "Hotels".to_string(),
                description: "Different description".to_string(),
            })
            .await;

        assert!(matches!(result, Err(CategoryError::NameExists)));
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = CategoryDao::new(create_sql_connect(&container));

        let id = uuid::Uuid::now_v7();
        let result = dao
            .update(
                id,
                UpdateCategoryCommand {
                    category_id: id,
                    name: Some("Renamed".to_string()),
                    description: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CategoryError::NotFound { category_id }) if category_id == id)
        );
    }
}
