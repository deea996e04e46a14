use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use caderneta_data::{Insert, Query, Retrieve, User, UserFilter};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<User> for Connection {
    type Filter = UserFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<User>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                email,
                password_hash,
                created_at
            FROM users
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email LIKE ").push_bind(email);
        }

        let users: Vec<User> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(users)
    }
}

#[async_trait]
impl Retrieve<User> for Connection {
    type Key = u32;

    async fn retrieve(&self, user_id: Self::Key) -> Result<User> {
        let filter = UserFilter {
            id: Some(user_id),
            ..Default::default()
        };
        let user = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(user)
    }
}

#[async_trait]
impl Insert<User> for Connection {
    async fn insert(&self, user: User) -> Result<User> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO users (
                    email,
                    password_hash
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&user.email)
                .push_bind(&user.password_hash);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}
