use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use caderneta_data::{
    Delete,
    Insert,
    Purchase,
    PurchaseFilter,
    Query,
    Retrieve,
    Update,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Purchase> for Connection {
    type Filter = PurchaseFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Purchase>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                person_id,
                created_by,
                date,
                description,
                ROUND(amount, 10) AS amount
            FROM purchases
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(person_id) = filter.person_id {
            qry.push(" AND person_id = ").push_bind(person_id);
        }
        if let Some(date_before) = filter.date_before {
            qry.push(" AND date <= ").push_bind(date_before);
        }
        if let Some(date_after) = filter.date_after {
            qry.push(" AND date >= ").push_bind(date_after);
        }
        qry.push(" ORDER BY date DESC, id DESC");

        let purchases: Vec<Purchase> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(purchases)
    }
}

#[async_trait]
impl Retrieve<Purchase> for Connection {
    type Key = u32;

    async fn retrieve(&self, purchase_id: Self::Key) -> Result<Purchase> {
        let filter = PurchaseFilter {
            id: Some(purchase_id),
            ..Default::default()
        };
        let purchase = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(purchase)
    }
}

#[async_trait]
impl Insert<Purchase> for Connection {
    async fn insert(&self, purchase: Purchase) -> Result<Purchase> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO purchases (
                    person_id,
                    created_by,
                    date,
                    description,
                    amount
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(purchase.person_id)
                .push_bind(purchase.created_by)
                .push_bind(purchase.date)
                .push_bind(&purchase.description)
                .push_bind(purchase.amount);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Purchase> for Connection {
    /// Update a purchase line item
    async fn update(&self, purchase: Purchase) -> Result<Purchase> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE purchases SET")
                .push(" date = ")
                .push_bind(purchase.date)
                .push(", description = ")
                .push_bind(&purchase.description)
                .push(", amount = ")
                .push_bind(purchase.amount)
                .push(" WHERE id = ")
                .push_bind(purchase.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(purchase.id).await
    }
}

#[async_trait]
impl Delete<Purchase> for Connection {
    /// Delete a purchase line item
    async fn delete(&self, purchase: Purchase) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM purchases WHERE id = ")
            .push_bind(purchase.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
