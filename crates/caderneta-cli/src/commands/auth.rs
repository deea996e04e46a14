use anyhow::Result;
use clap::{Args, Subcommand};
use inquire::Password;

use caderneta_auth::SessionGate;
use caderneta_data::{Retrieve, User};
use caderneta_db::Connection;

use crate::session;

#[derive(Subcommand, Debug)]
pub enum Auth {
    /// Sign in with email and password
    #[clap(name = "login")]
    Login(Login),
    /// Create an account and sign in
    #[clap(name = "signup")]
    Signup(Signup),
    /// Sign out and forget the stored session
    #[clap(name = "logout")]
    Logout(Logout),
    /// Show the signed-in user
    #[clap(name = "whoami")]
    Whoami(Whoami),
}

impl Auth {
    pub async fn run(
        self,
        db: &Connection,
        gate: &SessionGate,
        session_file: &str,
    ) -> Result<()> {
        match self {
            Auth::Login(cmd) => cmd.run(db, gate, session_file).await,
            Auth::Signup(cmd) => cmd.run(db, gate, session_file).await,
            Auth::Logout(cmd) => cmd.run(db, gate, session_file).await,
            Auth::Whoami(cmd) => cmd.run(db, gate).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct Login {
    #[clap(short, long)]
    pub email: String,
    /// Prompted for when not given.
    #[clap(short, long)]
    pub password: Option<String>,
}

impl Login {
    pub async fn run(
        self,
        db: &Connection,
        gate: &SessionGate,
        session_file: &str,
    ) -> Result<()> {
        // Signed-in users land on the record list, not the login view.
        if let Some(session) = gate.current() {
            let user: User = db.retrieve(session.user_id).await?;
            println!(
                "Already signed in as {}. Run `caderneta auth logout` first to switch accounts.",
                user.email
            );
            return Ok(());
        }

        let password = match self.password {
            Some(password) => password,
            None => Password::new("Password:").without_confirmation().prompt()?,
        };

        let session = caderneta_auth::sign_in(db, &self.email, &password).await?;
        session::store(session_file, &session.token)?;
        gate.set(Some(session));
        println!("Signed in as {}.", self.email);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct Signup {
    #[clap(short, long)]
    pub email: String,
    /// Prompted for (with confirmation) when not given.
    #[clap(short, long)]
    pub password: Option<String>,
}

impl Signup {
    pub async fn run(
        self,
        db: &Connection,
        gate: &SessionGate,
        session_file: &str,
    ) -> Result<()> {
        if let Some(session) = gate.current() {
            let user: User = db.retrieve(session.user_id).await?;
            println!(
                "Already signed in as {}. Run `caderneta auth logout` first.",
                user.email
            );
            return Ok(());
        }

        let password = match self.password {
            Some(password) => password,
            None => Password::new("Password:").prompt()?,
        };

        let user = caderneta_auth::sign_up(db, &self.email, &password).await?;
        println!("Account created for {}.", user.email);

        let session = caderneta_auth::sign_in(db, &self.email, &password).await?;
        session::store(session_file, &session.token)?;
        gate.set(Some(session));
        println!("Signed in as {}.", user.email);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct Logout {}

impl Logout {
    pub async fn run(
        self,
        db: &Connection,
        gate: &SessionGate,
        session_file: &str,
    ) -> Result<()> {
        match gate.current() {
            None => println!("Not signed in."),
            Some(session) => {
                caderneta_auth::sign_out(db, &session.token).await?;
                session::clear(session_file)?;
                gate.set(None);
                println!("Signed out.");
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct Whoami {}

impl Whoami {
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        let session = session::require(gate)?;
        let user: User = db.retrieve(session.user_id).await?;
        println!("{}", user.email);
        println!("Session started at {}.", session.created_at);
        Ok(())
    }
}
