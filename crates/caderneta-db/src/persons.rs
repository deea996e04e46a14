use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use caderneta_data::{
    Count,
    Delete,
    Insert,
    Person,
    PersonFilter,
    Query,
    Retrieve,
    Update,
};

use crate::{
    results::{Id, QueryError, Total},
    Connection,
};

const PERSON_COLUMNS: &str = r#"
    id,
    created_by,
    created_at,
    updated_at,
    name,
    age,
    years_as_member,
    record_number,
    marital_status,
    birth_date,
    spouse_name,
    spouse_age,
    spouse_years_as_member,
    spouse_birth_date,
    congregation,
    postal_code,
    street,
    house_number,
    neighborhood,
    city,
    state,
    address,
    ROUND(rent, 10) AS rent,
    ROUND(salary, 10) AS salary,
    ROUND(pension, 10) AS pension,
    ROUND(monthly_dues, 10) AS monthly_dues,
    has_dependents,
    dependents_at_home,
    sons_ages,
    daughters_ages,
    sons_count,
    daughters_count,
    working_dependents,
    ROUND(dependents_salary, 10) AS dependents_salary
"#;

/// Apply the filter conditions shared by the list and count queries.
fn push_filter<'a>(qry: &mut QueryBuilder<'a, Sqlite>, filter: &PersonFilter) {
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(query) = filter.query.clone() {
        let pattern = format!("%{}%", query.trim());
        qry.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR record_number LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl Query<Person> for Connection {
    type Filter = PersonFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Person>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::new(format!(
            "SELECT {} FROM persons WHERE 1", PERSON_COLUMNS
        ));
        push_filter(&mut qry, filter);
        qry.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            qry.push(" LIMIT ").push_bind(limit);
            qry.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));
        }

        let persons: Vec<Person> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(persons)
    }
}

#[async_trait]
impl Count<Person> for Connection {
    type Filter = PersonFilter;

    /// Number of records matching the filter, ignoring pagination.
    async fn count(&self, filter: &Self::Filter) -> Result<i64> {
        let mut conn = self.lock().await;
        let mut qry =
            QueryBuilder::new("SELECT COUNT(id) AS total FROM persons WHERE 1");
        push_filter(&mut qry, filter);
        let total: Total = qry.build_query_as().fetch_one(&mut *conn).await?;
        Ok(total.total)
    }
}

#[async_trait]
impl Retrieve<Person> for Connection {
    type Key = u32;

    async fn retrieve(&self, person_id: Self::Key) -> Result<Person> {
        let filter = PersonFilter {
            id: Some(person_id),
            ..Default::default()
        };
        let person = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(person)
    }
}

#[async_trait]
impl Insert<Person> for Connection {
    async fn insert(&self, person: Person) -> Result<Person> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO persons (
                    created_by,
                    name,
                    age,
                    years_as_member,
                    record_number,
                    marital_status,
                    birth_date,
                    spouse_name,
                    spouse_age,
                    spouse_years_as_member,
                    spouse_birth_date,
                    congregation,
                    postal_code,
                    street,
                    house_number,
                    neighborhood,
                    city,
                    state,
                    address,
                    rent,
                    salary,
                    pension,
                    monthly_dues,
                    has_dependents,
                    dependents_at_home,
                    sons_ages,
                    daughters_ages,
                    sons_count,
                    daughters_count,
                    working_dependents,
                    dependents_salary
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(person.created_by)
                .push_bind(&person.name)
                .push_bind(person.age)
                .push_bind(person.years_as_member)
                .push_bind(&person.record_number)
                .push_bind(person.marital_status)
                .push_bind(person.birth_date)
                .push_bind(&person.spouse_name)
                .push_bind(person.spouse_age)
                .push_bind(person.spouse_years_as_member)
                .push_bind(person.spouse_birth_date)
                .push_bind(&person.congregation)
                .push_bind(&person.postal_code)
                .push_bind(&person.street)
                .push_bind(&person.house_number)
                .push_bind(&person.neighborhood)
                .push_bind(&person.city)
                .push_bind(&person.state)
                .push_bind(&person.address)
                .push_bind(person.rent)
                .push_bind(person.salary)
                .push_bind(person.pension)
                .push_bind(person.monthly_dues)
                .push_bind(person.has_dependents)
                .push_bind(person.dependents_at_home)
                .push_bind(person.sons_ages.clone())
                .push_bind(person.daughters_ages.clone())
                .push_bind(person.sons_count)
                .push_bind(person.daughters_count)
                .push_bind(person.working_dependents)
                .push_bind(person.dependents_salary);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Person> for Connection {
    /// Update a member record and bump its updated_at timestamp.
    async fn update(&self, person: Person) -> Result<Person> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE persons SET")
                .push(" name = ")
                .push_bind(&person.name)
                .push(", age = ")
                .push_bind(person.age)
                .push(", years_as_member = ")
                .push_bind(person.years_as_member)
                .push(", record_number = ")
                .push_bind(&person.record_number)
                .push(", marital_status = ")
                .push_bind(person.marital_status)
                .push(", birth_date = ")
                .push_bind(person.birth_date)
                .push(", spouse_name = ")
                .push_bind(&person.spouse_name)
                .push(", spouse_age = ")
                .push_bind(person.spouse_age)
                .push(", spouse_years_as_member = ")
                .push_bind(person.spouse_years_as_member)
                .push(", spouse_birth_date = ")
                .push_bind(person.spouse_birth_date)
                .push(", congregation = ")
                .push_bind(&person.congregation)
                .push(", postal_code = ")
                .push_bind(&person.postal_code)
                .push(", street = ")
                .push_bind(&person.street)
                .push(", house_number = ")
                .push_bind(&person.house_number)
                .push(", neighborhood = ")
                .push_bind(&person.neighborhood)
                .push(", city = ")
                .push_bind(&person.city)
                .push(", state = ")
                .push_bind(&person.state)
                .push(", address = ")
                .push_bind(&person.address)
                .push(", rent = ")
                .push_bind(person.rent)
                .push(", salary = ")
                .push_bind(person.salary)
                .push(", pension = ")
                .push_bind(person.pension)
                .push(", monthly_dues = ")
                .push_bind(person.monthly_dues)
                .push(", has_dependents = ")
                .push_bind(person.has_dependents)
                .push(", dependents_at_home = ")
                .push_bind(person.dependents_at_home)
                .push(", sons_ages = ")
                .push_bind(person.sons_ages.clone())
                .push(", daughters_ages = ")
                .push_bind(person.daughters_ages.clone())
                .push(", sons_count = ")
                .push_bind(person.sons_count)
                .push(", daughters_count = ")
                .push_bind(person.daughters_count)
                .push(", working_dependents = ")
                .push_bind(person.working_dependents)
                .push(", dependents_salary = ")
                .push_bind(person.dependents_salary)
                .push(", updated_at = CURRENT_TIMESTAMP")
                .push(" WHERE id = ")
                .push_bind(person.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(person.id).await
    }
}

#[async_trait]
impl Delete<Person> for Connection {
    /// Delete a member record
    async fn delete(&self, person: Person) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM persons WHERE id = ")
            .push_bind(person.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use caderneta_data::{AgeList, MaritalStatus, Purchase};

    #[tokio::test]
    async fn test_person_insert() {
        let (_handle, db) = Connection::open_test().await;
        let person = Person {
            name: "João da Silva".to_string(),
            age: Some(52),
            years_as_member: Some(20),
            record_number: Some("P-0023".to_string()),
            marital_status: MaritalStatus::Married,
            birth_date: NaiveDate::from_ymd_opt(1972, 3, 9),
            spouse_name: Some("Maria da Silva".to_string()),
            spouse_age: Some(49),
            congregation: Some("Centro".to_string()),
            postal_code: Some("13010-001".to_string()),
            monthly_dues: Some(50.0),
            has_dependents: true,
            sons_ages: AgeList(vec![12, 15]),
            daughters_ages: AgeList(vec![9]),
            ..Person::default()
        }
        .normalized();
        let person = db.insert(person).await.unwrap();

        assert!(person.id > 0);
        assert_eq!(person.name, "João da Silva");
        assert_eq!(person.age, Some(52));
        assert_eq!(person.record_number.as_deref(), Some("P-0023"));
        assert_eq!(person.marital_status, MaritalStatus::Married);
        assert_eq!(person.birth_date, NaiveDate::from_ymd_opt(1972, 3, 9));
        assert_eq!(person.spouse_name.as_deref(), Some("Maria da Silva"));
        assert_eq!(person.monthly_dues, Some(50.0));
        assert_eq!(person.sons_ages, AgeList(vec![12, 15]));
        assert_eq!(person.sons_count, 2);
        assert_eq!(person.daughters_count, 1);
    }

    #[tokio::test]
    async fn test_person_insert_single_persists_no_spouse() {
        let (_handle, db) = Connection::open_test().await;
        // Stray spouse input on a single record must not be persisted.
        let person = Person {
            name: "Ana".to_string(),
            marital_status: MaritalStatus::Single,
            spouse_name: Some("stray".to_string()),
            spouse_age: Some(99),
            ..Person::default()
        }
        .normalized();
        let person = db.insert(person).await.unwrap();

        assert_eq!(person.spouse_name, None);
        assert_eq!(person.spouse_age, None);
        assert_eq!(person.spouse_years_as_member, None);
        assert_eq!(person.spouse_birth_date, None);
    }

    #[tokio::test]
    async fn test_person_insert_without_dependents_persists_nothing() {
        let (_handle, db) = Connection::open_test().await;
        let person = Person {
            name: "Pedro".to_string(),
            has_dependents: false,
            sons_ages: AgeList(vec![1, 2, 3]),
            dependents_salary: Some(1200.0),
            ..Person::default()
        }
        .normalized();
        let person = db.insert(person).await.unwrap();

        assert!(person.sons_ages.is_empty());
        assert_eq!(person.sons_count, 0);
        assert_eq!(person.dependents_at_home, None);
        assert_eq!(person.dependents_salary, None);
    }

    #[tokio::test]
    async fn test_person_update() {
        let (_handle, db) = Connection::open_test().await;
        let person = Person {
            name: "Carlos".to_string(),
            marital_status: MaritalStatus::Married,
            spouse_name: Some("Rita".to_string()),
            ..Person::default()
        };
        let mut person = db.insert(person).await.unwrap();

        person.name = "Carlos Alberto".to_string();
        person.marital_status = MaritalStatus::Widowed;
        person.salary = Some(2300.5);
        let person = db.update(person.normalized()).await.unwrap();

        assert_eq!(person.name, "Carlos Alberto");
        assert_eq!(person.marital_status, MaritalStatus::Widowed);
        assert_eq!(person.salary, Some(2300.5));
        // Widowed records keep no spouse data.
        assert_eq!(person.spouse_name, None);
    }

    #[tokio::test]
    async fn test_person_query_matches_name_or_record_number() {
        let (_handle, db) = Connection::open_test().await;
        db.insert(Person {
            name: "José Santos".to_string(),
            record_number: Some("P-100".to_string()),
            ..Person::default()
        })
        .await
        .unwrap();
        db.insert(Person {
            name: "Marcos Lima".to_string(),
            record_number: Some("P-200".to_string()),
            ..Person::default()
        })
        .await
        .unwrap();

        // Case-insensitive name substring.
        let persons: Vec<Person> = db
            .query(&PersonFilter {
                query: Some("jOsÉ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "José Santos");

        // Record number substring.
        let persons: Vec<Person> = db
            .query(&PersonFilter {
                query: Some("200".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "Marcos Lima");

        // No match.
        let persons: Vec<Person> = db
            .query(&PersonFilter {
                query: Some("nobody".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(persons.is_empty());
    }

    #[tokio::test]
    async fn test_person_pagination() {
        let (_handle, db) = Connection::open_test().await;
        for i in 1..=25 {
            db.insert(Person {
                name: format!("Member {}", i),
                ..Person::default()
            })
            .await
            .unwrap();
        }

        let total = db.count(&PersonFilter::default()).await.unwrap();
        assert_eq!(total, 25);

        // Page 1: newest first.
        let page: Vec<Person> = db
            .query(&PersonFilter {
                limit: Some(10),
                offset: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].name, "Member 25");
        assert_eq!(page[9].name, "Member 16");

        // Page 3: the remaining five records.
        let page: Vec<Person> = db
            .query(&PersonFilter {
                limit: Some(10),
                offset: Some(20),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[4].name, "Member 1");

        // The count ignores pagination bounds.
        let total = db
            .count(&PersonFilter {
                limit: Some(10),
                offset: Some(20),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 25);
    }

    #[tokio::test]
    async fn test_person_delete() {
        let (_handle, db) = Connection::open_test().await;
        let person = db
            .insert(Person {
                name: "Temporária".to_string(),
                ..Person::default()
            })
            .await
            .unwrap();
        let person_id = person.id;

        db.delete(person).await.unwrap();

        let result: Result<Person> = db.retrieve(person_id).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_person_get_related_purchases() {
        let (_handle, db) = Connection::open_test().await;
        let person = db
            .insert(Person {
                name: "Comprador".to_string(),
                ..Person::default()
            })
            .await
            .unwrap();

        for _ in 0..2 {
            db.insert(Purchase {
                person_id: person.id,
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let purchases = person.get_purchases(&db).await.unwrap();
        assert_eq!(purchases.len(), 2);
    }
}
