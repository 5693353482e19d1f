use async_trait::async_trait;
use scylla::IntoTypedRows;
use scylla::query::Query;

use crate::db::{DbClient, DbError, UserRow, lwt_applied};
use crate::domain::User;

use super::UserRepository;

#[derive(Clone)]
pub struct ScyllaUserRepository {
    client: DbClient,
}

impl ScyllaUserRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for ScyllaUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let query = Query::new(crate::db::queries::SELECT_USER_BY_USERNAME);

        let result = self
            .client
            .session()
            .query(query, (username,))
            .await?;

        let Some(row) = result.rows.unwrap_or_default().into_typed::<UserRow>().next() else {
            return Ok(None);
        };
        let row = row.map_err(|e| DbError::SerializationError(format!("Failed to parse user row: {}", e)))?;

        Ok(Some(row.to_user()))
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<bool, DbError> {
        let row = UserRow::from_user(user);
        let query = Query::new(crate::db::queries::INSERT_USER_IF_ABSENT);

        let result = self
            .client
            .session()
            .query(
                query,
                (
                    row.username,
                    row.user_id,
                    row.email,
                    row.password_hash,
                    row.roles,
                ),
            )
            .await?;

        lwt_applied(&result)
    }
}
