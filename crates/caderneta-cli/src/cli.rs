use clap::{Parser, Subcommand};

use crate::commands::{Auth, Members, Purchases};

#[derive(Parser, Debug)]
#[clap(name = "caderneta", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to the records database.
    #[clap(long, env = "CADERNETA_DB")]
    pub db: Option<String>,

    /// Where the signed-in session token is kept.
    #[clap(long, env = "CADERNETA_SESSION", default_value = ".caderneta-session")]
    pub session_file: String,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign up, sign in and out, inspect the session
    #[clap(subcommand)]
    Auth(Auth),
    /// Member records
    #[clap(subcommand)]
    Members(Members),
    /// Purchase history
    #[clap(subcommand)]
    Purchases(Purchases),
}
