use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

use caderneta_auth::SessionGate;
use caderneta_cli::cli::{Cli, Command};
use caderneta_cli::session;
use caderneta_db::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::init();
    let Some(db_file) = cli.db.clone() else {
        bail!(
            "No database configured. Set CADERNETA_DB or pass --db; \
             sign-in stays disabled until then."
        );
    };

    let db = Connection::open(&db_file).await?;

    // Resolve the stored session once, then watch it for the lifetime
    // of the invocation.
    let gate = SessionGate::new(session::load(&db, &cli.session_file).await?);
    let mut session_watch = gate.subscribe();

    match cli.command {
        Command::Auth(cmd) => cmd.run(&db, &gate, &cli.session_file).await,
        Command::Members(cmd) => cmd.run(&db, &gate).await,
        Command::Purchases(cmd) => cmd.run(&db, &gate).await,
    }?;

    if session_watch.has_changed()? {
        let signed_in = session_watch.borrow_and_update().is_some();
        tracing::debug!(signed_in, "session state changed");
    }

    Ok(())
}
