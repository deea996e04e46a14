use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};

use caderneta_auth::SessionGate;
use caderneta_data::Session;
use caderneta_db::Connection;

/// Resolve the session behind the stored token file, if any.
pub async fn load(db: &Connection, path: &str) -> Result<Option<Session>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let token = fs::read_to_string(path)?;
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    caderneta_auth::current_session(db, token).await
}

/// Persist the signed-in token.
pub fn store(path: &str, token: &str) -> Result<()> {
    fs::write(path, token)?;
    Ok(())
}

/// Forget the stored token.
pub fn clear(path: &str) -> Result<()> {
    let path = Path::new(path);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Every record command runs behind the session gate.
pub fn require(gate: &SessionGate) -> Result<Session> {
    gate.current()
        .ok_or_else(|| anyhow!("Not signed in. Run `caderneta auth login` first."))
}
