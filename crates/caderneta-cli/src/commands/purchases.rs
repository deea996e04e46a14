use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use caderneta_auth::SessionGate;
use caderneta_data::{
    Delete,
    Insert,
    Person,
    Purchase,
    PurchaseFilter,
    Query,
    Retrieve,
    Update,
};
use caderneta_db::Connection;

use crate::formatting::PrintFormatted;
use crate::input::{parse_brl_arg, parse_date_arg};
use crate::session;

#[derive(Subcommand, Debug)]
pub enum Purchases {
    /// List a member's purchase history
    #[clap(name = "list")]
    List(ListPurchases),
    /// Add a purchase to a member's history
    #[clap(name = "add")]
    Add(AddPurchase),
    /// Update a purchase
    #[clap(name = "set")]
    Update(UpdatePurchase),
    /// Delete a purchase
    #[clap(name = "delete")]
    Delete(DeletePurchase),
}

impl Purchases {
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        match self {
            Purchases::List(cmd) => cmd.run(db, gate).await,
            Purchases::Add(cmd) => cmd.run(db, gate).await,
            Purchases::Update(cmd) => cmd.run(db, gate).await,
            Purchases::Delete(cmd) => cmd.run(db, gate).await,
        }
    }
}

/// The history is always re-fetched in full, scoped to its owner.
async fn print_history(db: &Connection, person: &Person) -> Result<()> {
    let purchases = person.get_purchases(db).await?;
    println!();
    println!("Purchase history of {}:", person.name);
    purchases.print_formatted();
    Ok(())
}

#[derive(Args, Debug)]
pub struct ListPurchases {
    #[clap(long)]
    pub member_id: u32,
    #[clap(short, long, value_parser = parse_date_arg)]
    pub after_date: Option<NaiveDate>,
    #[clap(short, long, value_parser = parse_date_arg)]
    pub before_date: Option<NaiveDate>,
}

impl ListPurchases {
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let person: Person = db.retrieve(self.member_id).await?;
        let purchases: Vec<Purchase> = db
            .query(&PurchaseFilter {
                person_id: Some(person.id),
                date_after: self.after_date,
                date_before: self.before_date,
                ..Default::default()
            })
            .await?;

        println!("Purchase history of {}:", person.name);
        purchases.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddPurchase {
    #[clap(long)]
    pub member_id: u32,
    /// dd/mm/yyyy
    #[clap(short, long, value_parser = parse_date_arg)]
    pub date: NaiveDate,
    #[clap(long)]
    pub description: String,
    /// Follows the input mask: 1.234,56 or 123456.
    #[clap(short, long, value_parser = parse_brl_arg)]
    pub amount: f64,
}

impl AddPurchase {
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        let session = session::require(gate)?;

        let person: Person = db.retrieve(self.member_id).await?;
        let purchase = Purchase {
            person_id: person.id,
            created_by: Some(session.user_id),
            date: self.date,
            description: self.description,
            amount: self.amount,
            ..Default::default()
        };

        println!();
        purchase.print_formatted();
        println!();
        let confirm = Confirm::new("Add purchase?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let purchase = db.insert(purchase).await?;
        println!("Purchase added with id {}.", purchase.id);
        print_history(db, &person).await
    }
}

#[derive(Args, Debug)]
pub struct UpdatePurchase {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
    #[clap(long)]
    pub description: Option<String>,
    #[clap(short, long, value_parser = parse_brl_arg)]
    pub amount: Option<f64>,
}

impl UpdatePurchase {
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let purchase: Purchase = db.retrieve(self.id).await?;
        let person: Person = db.retrieve(purchase.person_id).await?;

        let mut update = purchase.clone();
        if let Some(date) = self.date {
            update.date = date;
        }
        if let Some(description) = self.description {
            update.description = description;
        }
        if let Some(amount) = self.amount {
            update.amount = amount;
        }

        println!();
        (purchase.clone(), update.clone()).print_formatted();
        println!();
        let confirm = Confirm::new("Update purchase?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.update(update).await?;
        print_history(db, &person).await
    }
}

#[derive(Args, Debug)]
pub struct DeletePurchase {
    #[clap(short, long)]
    pub id: u32,
}

impl DeletePurchase {
    pub async fn run(&self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let purchase: Purchase = db.retrieve(self.id).await?;
        let person: Person = db.retrieve(purchase.person_id).await?;

        println!();
        purchase.print_formatted();
        println!();
        let confirm = Confirm::new("Delete this purchase?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.delete(purchase).await?;
        println!("Purchase deleted.");
        print_history(db, &person).await
    }
}
