use anyhow::Result;
use thiserror::Error as ThisError;

use caderneta_data::{
    Delete,
    Insert,
    Query,
    Retrieve,
    Session,
    User,
    UserFilter,
};
use caderneta_db::{results::QueryError, Connection};

use crate::password;

#[derive(Debug, Clone, ThisError)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("A user with email {0} already exists")]
    EmailTaken(String),
}

/// Register a new user.
pub async fn sign_up(
    db: &Connection,
    email: &str,
    password: &str,
) -> Result<User> {
    let users: Vec<User> = db
        .query(&UserFilter {
            email: Some(email.to_string()),
            ..Default::default()
        })
        .await?;
    if !users.is_empty() {
        return Err(AuthError::EmailTaken(email.to_string()).into());
    }

    let user = User {
        email: email.to_string(),
        password_hash: password::hash_password(password),
        ..Default::default()
    };
    let user = db.insert(user).await?;
    Ok(user)
}

/// Verify credentials and issue a session.
pub async fn sign_in(
    db: &Connection,
    email: &str,
    password: &str,
) -> Result<Session> {
    let mut users: Vec<User> = db
        .query(&UserFilter {
            email: Some(email.to_string()),
            ..Default::default()
        })
        .await?;
    if users.len() > 1 {
        return Err(QueryError::Ambiguous(users.len()).into());
    }
    let user = users.pop().ok_or(AuthError::InvalidCredentials)?;
    if !password::verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    let session = Session {
        token: generate_token(),
        user_id: user.id,
        ..Default::default()
    };
    let session = db.insert(session).await?;
    Ok(session)
}

/// Revoke the session behind a token. Unknown tokens are a no-op.
pub async fn sign_out(db: &Connection, token: &str) -> Result<()> {
    if let Some(session) = current_session(db, token).await? {
        db.delete(session).await?;
    }
    Ok(())
}

/// Resolve a token to its session, if it is still valid.
pub async fn current_session(
    db: &Connection,
    token: &str,
) -> Result<Option<Session>> {
    let session: Result<Session> = db.retrieve(token.to_string()).await;
    match session {
        Ok(session) => Ok(Some(session)),
        Err(err) => match err.downcast_ref::<QueryError>() {
            Some(QueryError::NotFound) => Ok(None),
            _ => Err(err),
        },
    }
}

/// A fresh random session token.
pub fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let (_handle, db) = Connection::open_test().await;

        let user = sign_up(&db, "irmao@caderneta.br", "senha123")
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_ne!(user.password_hash, "senha123");

        let session = sign_in(&db, "irmao@caderneta.br", "senha123")
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let (_handle, db) = Connection::open_test().await;
        sign_up(&db, "dup@caderneta.br", "senha").await.unwrap();

        let result = sign_up(&db, "dup@caderneta.br", "outra").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_sign_in_bad_credentials() {
        let (_handle, db) = Connection::open_test().await;
        sign_up(&db, "irmao@caderneta.br", "senha123").await.unwrap();

        assert!(sign_in(&db, "irmao@caderneta.br", "errada").await.is_err());
        assert!(sign_in(&db, "outro@caderneta.br", "senha123").await.is_err());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (_handle, db) = Connection::open_test().await;
        sign_up(&db, "irmao@caderneta.br", "senha").await.unwrap();
        let session = sign_in(&db, "irmao@caderneta.br", "senha").await.unwrap();

        let resolved = current_session(&db, &session.token).await.unwrap();
        assert_eq!(resolved.map(|s| s.user_id), Some(session.user_id));

        sign_out(&db, &session.token).await.unwrap();
        let resolved = current_session(&db, &session.token).await.unwrap();
        assert!(resolved.is_none());

        // Signing out twice is fine.
        sign_out(&db, &session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_token() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_eq!(t1.len(), 64);
        assert_ne!(t1, t2);
    }
}
