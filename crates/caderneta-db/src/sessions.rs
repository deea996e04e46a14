use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use caderneta_data::{Delete, Insert, Query, Retrieve, Session, SessionFilter};

use crate::{results::QueryError, Connection};

#[async_trait]
impl Query<Session> for Connection {
    type Filter = SessionFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Session>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                token,
                user_id,
                created_at
            FROM sessions
            WHERE 1
            "#,
        );
        if let Some(token) = filter.token.clone() {
            qry.push(" AND token = ").push_bind(token);
        }
        if let Some(user_id) = filter.user_id {
            qry.push(" AND user_id = ").push_bind(user_id);
        }

        let sessions: Vec<Session> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(sessions)
    }
}

#[async_trait]
impl Retrieve<Session> for Connection {
    type Key = String;

    async fn retrieve(&self, token: Self::Key) -> Result<Session> {
        let filter = SessionFilter {
            token: Some(token),
            ..Default::default()
        };
        let session = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(session)
    }
}

#[async_trait]
impl Insert<Session> for Connection {
    async fn insert(&self, session: Session) -> Result<Session> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO sessions (
                    token,
                    user_id
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&session.token)
                .push_bind(session.user_id);

            qry.push(") ").build().execute(&mut *conn).await?;
        }
        self.retrieve(session.token).await
    }
}

#[async_trait]
impl Delete<Session> for Connection {
    /// Revoke a session
    async fn delete(&self, session: Session) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM sessions WHERE token = ")
            .push_bind(&session.token)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
