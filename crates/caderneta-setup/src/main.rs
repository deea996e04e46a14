use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use caderneta_db::{schema, Connection};

#[derive(Parser, Debug)]
#[clap(name = "caderneta-setup")]
struct Cli {
    /// Path to the records database.
    #[clap(long, env = "CADERNETA_DB")]
    pub db: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init,
}

/// Initialize the database
async fn db_init(filename: &str) -> Result<()> {
    let conn = Connection::open(filename).await?;
    schema::install(&conn).await?;
    println!("Database schema installed in {}.", filename);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let Some(db_file) = cli.db else {
        bail!("No database configured. Set CADERNETA_DB or pass --db.");
    };
    match cli.command {
        Command::Init => db_init(&db_file).await?,
    }
    Ok(())
}
