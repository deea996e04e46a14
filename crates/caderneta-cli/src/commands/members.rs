use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use caderneta_auth::SessionGate;
use caderneta_data::{
    AgeList,
    Count,
    Delete,
    Insert,
    MaritalStatus,
    Person,
    PersonFilter,
    Query,
    Retrieve,
    Update,
};
use caderneta_db::Connection;
use caderneta_format::mask_postal_code;
use caderneta_lookup::AddressLookup;

use crate::formatting::PrintFormatted;
use crate::input::{parse_brl_arg, parse_date_arg};
use crate::session;

/// Records per page in the list view.
const PAGE_SIZE: u32 = 10;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// Show a member record with its purchase history
    #[clap(name = "show")]
    Show(ShowMember),
    /// List and search member records
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member record
    #[clap(name = "add")]
    Add(AddMember),
    /// Update a member record
    #[clap(name = "set")]
    Update(UpdateMember),
    /// Delete a member record
    #[clap(name = "delete")]
    Delete(DeleteMember),
}

impl Members {
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        match self {
            Members::Show(cmd) => cmd.run(db, gate).await,
            Members::List(cmd) => cmd.run(db, gate).await,
            Members::Add(cmd) => cmd.run(db, gate).await,
            Members::Update(cmd) => cmd.run(db, gate).await,
            Members::Delete(cmd) => cmd.run(db, gate).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowMember {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowMember {
    /// Run the command and show a member record
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let person: Person = db.retrieve(self.id).await?;
        println!();
        person.print_formatted();

        let purchases = person.get_purchases(db).await?;
        println!();
        println!("Purchase history:");
        purchases.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    /// Search by name or record number.
    #[clap(short, long)]
    pub query: Option<String>,
    /// Page to show, starting at 1.
    #[clap(short, long, default_value_t = 1)]
    pub page: u32,
}

impl ListMembers {
    /// Run the command and list member records
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let page = self.page.max(1);
        let query = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        let filter = PersonFilter {
            query,
            limit: Some(PAGE_SIZE),
            offset: Some((page - 1) * PAGE_SIZE),
            ..Default::default()
        };

        let total = db.count(&filter).await?;
        let persons: Vec<Person> = db.query(&filter).await?;
        persons.print_formatted();

        let (first, last) = page_bounds(page, persons.len(), total);
        println!();
        println!("Showing {}-{} of {}", first, last, total);
        if page > 1 {
            println!("Previous page: --page {}", page - 1);
        }
        if last < total {
            println!("Next page: --page {}", page + 1);
        }
        Ok(())
    }
}

/// 1-based bounds of the rows shown on a page.
fn page_bounds(page: u32, shown: usize, total: i64) -> (i64, i64) {
    if total == 0 || shown == 0 {
        return (0, 0);
    }
    let first = ((page - 1) * PAGE_SIZE) as i64 + 1;
    let last = first + shown as i64 - 1;
    (first.min(total), last.min(total))
}

#[derive(Args, Debug)]
pub struct AddMember {
    #[clap(short, long)]
    pub name: String,
    #[clap(long)]
    pub age: Option<u32>,
    #[clap(long)]
    pub years_as_member: Option<u32>,
    #[clap(long)]
    pub record_number: Option<String>,
    /// single, married, widowed or separated.
    #[clap(long, default_value = "single")]
    pub marital_status: MaritalStatus,
    /// dd/mm/yyyy
    #[clap(long, value_parser = parse_date_arg)]
    pub birth_date: Option<NaiveDate>,

    #[clap(long)]
    pub spouse_name: Option<String>,
    #[clap(long)]
    pub spouse_age: Option<u32>,
    #[clap(long)]
    pub spouse_years_as_member: Option<u32>,
    #[clap(long, value_parser = parse_date_arg)]
    pub spouse_birth_date: Option<NaiveDate>,

    #[clap(long)]
    pub congregation: Option<String>,

    /// Address fields left out are completed from the CEP lookup.
    #[clap(long)]
    pub postal_code: Option<String>,
    #[clap(long)]
    pub street: Option<String>,
    #[clap(long)]
    pub house_number: Option<String>,
    #[clap(long)]
    pub neighborhood: Option<String>,
    #[clap(long)]
    pub city: Option<String>,
    #[clap(long)]
    pub state: Option<String>,

    /// Currency values follow the input mask: 1.234,56 or 123456.
    #[clap(long, value_parser = parse_brl_arg)]
    pub rent: Option<f64>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub salary: Option<f64>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub pension: Option<f64>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub monthly_dues: Option<f64>,

    #[clap(long)]
    pub has_dependents: bool,
    #[clap(long)]
    pub dependents_at_home: Option<u32>,
    /// Comma separated ages, e.g. "3, 7, 11".
    #[clap(long)]
    pub sons_ages: Option<AgeList>,
    #[clap(long)]
    pub daughters_ages: Option<AgeList>,
    #[clap(long)]
    pub working_dependents: Option<u32>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub dependents_salary: Option<f64>,
}

impl AddMember {
    /// Run the command and add a member record to the database
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        let session = session::require(gate)?;

        let mut person = Person {
            created_by: Some(session.user_id),
            name: self.name,
            age: self.age,
            years_as_member: self.years_as_member,
            record_number: self.record_number,
            marital_status: self.marital_status,
            birth_date: self.birth_date,
            spouse_name: self.spouse_name,
            spouse_age: self.spouse_age,
            spouse_years_as_member: self.spouse_years_as_member,
            spouse_birth_date: self.spouse_birth_date,
            congregation: self.congregation,
            postal_code: self.postal_code.as_deref().map(mask_postal_code),
            street: self.street,
            house_number: self.house_number,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            rent: self.rent,
            salary: self.salary,
            pension: self.pension,
            monthly_dues: self.monthly_dues,
            has_dependents: self.has_dependents,
            dependents_at_home: self.dependents_at_home,
            sons_ages: self.sons_ages.unwrap_or_default(),
            daughters_ages: self.daughters_ages.unwrap_or_default(),
            working_dependents: self.working_dependents,
            dependents_salary: self.dependents_salary,
            ..Default::default()
        };

        fill_address(&mut person).await;
        let person = person.normalized();

        println!();
        person.print_formatted();
        println!();

        let confirm = Confirm::new("Add member record?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let person = db.insert(person).await?;
        println!("Member record added with id {}.", person.id);
        Ok(())
    }
}

/// Best effort: complete missing address fields from the postal-code
/// lookup. Failures never block the record.
async fn fill_address(person: &mut Person) {
    let Some(postal_code) = person.postal_code.clone() else {
        return;
    };
    match AddressLookup::new().lookup(&postal_code).await {
        Ok(Some(address)) => {
            if person.street.is_none() {
                person.street = non_empty(address.street);
            }
            if person.neighborhood.is_none() {
                person.neighborhood = non_empty(address.neighborhood);
            }
            if person.city.is_none() {
                person.city = non_empty(address.city);
            }
            if person.state.is_none() {
                person.state = non_empty(address.state);
            }
        }
        Ok(None) => {}
        Err(err) => tracing::debug!(%err, "address lookup failed"),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Args, Debug)]
pub struct UpdateMember {
    #[clap(short, long)]
    pub id: u32,
    #[clap(long)]
    pub name: Option<String>,
    #[clap(long)]
    pub age: Option<u32>,
    #[clap(long)]
    pub years_as_member: Option<u32>,
    #[clap(long)]
    pub record_number: Option<String>,
    #[clap(long)]
    pub marital_status: Option<MaritalStatus>,
    #[clap(long, value_parser = parse_date_arg)]
    pub birth_date: Option<NaiveDate>,

    #[clap(long)]
    pub spouse_name: Option<String>,
    #[clap(long)]
    pub spouse_age: Option<u32>,
    #[clap(long)]
    pub spouse_years_as_member: Option<u32>,
    #[clap(long, value_parser = parse_date_arg)]
    pub spouse_birth_date: Option<NaiveDate>,

    #[clap(long)]
    pub congregation: Option<String>,

    #[clap(long)]
    pub postal_code: Option<String>,
    #[clap(long)]
    pub street: Option<String>,
    #[clap(long)]
    pub house_number: Option<String>,
    #[clap(long)]
    pub neighborhood: Option<String>,
    #[clap(long)]
    pub city: Option<String>,
    #[clap(long)]
    pub state: Option<String>,

    #[clap(long, value_parser = parse_brl_arg)]
    pub rent: Option<f64>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub salary: Option<f64>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub pension: Option<f64>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub monthly_dues: Option<f64>,

    /// true or false.
    #[clap(long)]
    pub has_dependents: Option<bool>,
    #[clap(long)]
    pub dependents_at_home: Option<u32>,
    #[clap(long)]
    pub sons_ages: Option<AgeList>,
    #[clap(long)]
    pub daughters_ages: Option<AgeList>,
    #[clap(long)]
    pub working_dependents: Option<u32>,
    #[clap(long, value_parser = parse_brl_arg)]
    pub dependents_salary: Option<f64>,
}

impl UpdateMember {
    /// Run the command and update a member record
    pub async fn run(self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let person: Person = db.retrieve(self.id).await?;
        let mut update = person.clone();

        if let Some(name) = self.name {
            update.name = name;
        }
        if let Some(age) = self.age {
            update.age = Some(age);
        }
        if let Some(years) = self.years_as_member {
            update.years_as_member = Some(years);
        }
        if let Some(record_number) = self.record_number {
            update.record_number = Some(record_number);
        }
        if let Some(marital_status) = self.marital_status {
            update.marital_status = marital_status;
        }
        if let Some(birth_date) = self.birth_date {
            update.birth_date = Some(birth_date);
        }
        if let Some(spouse_name) = self.spouse_name {
            update.spouse_name = Some(spouse_name);
        }
        if let Some(spouse_age) = self.spouse_age {
            update.spouse_age = Some(spouse_age);
        }
        if let Some(years) = self.spouse_years_as_member {
            update.spouse_years_as_member = Some(years);
        }
        if let Some(spouse_birth_date) = self.spouse_birth_date {
            update.spouse_birth_date = Some(spouse_birth_date);
        }
        if let Some(congregation) = self.congregation {
            update.congregation = Some(congregation);
        }
        if let Some(postal_code) = self.postal_code {
            update.postal_code = Some(mask_postal_code(&postal_code));
        }
        if let Some(street) = self.street {
            update.street = Some(street);
        }
        if let Some(house_number) = self.house_number {
            update.house_number = Some(house_number);
        }
        if let Some(neighborhood) = self.neighborhood {
            update.neighborhood = Some(neighborhood);
        }
        if let Some(city) = self.city {
            update.city = Some(city);
        }
        if let Some(state) = self.state {
            update.state = Some(state);
        }
        if let Some(rent) = self.rent {
            update.rent = Some(rent);
        }
        if let Some(salary) = self.salary {
            update.salary = Some(salary);
        }
        if let Some(pension) = self.pension {
            update.pension = Some(pension);
        }
        if let Some(monthly_dues) = self.monthly_dues {
            update.monthly_dues = Some(monthly_dues);
        }
        if let Some(has_dependents) = self.has_dependents {
            update.has_dependents = has_dependents;
        }
        if let Some(dependents_at_home) = self.dependents_at_home {
            update.dependents_at_home = Some(dependents_at_home);
        }
        if let Some(sons_ages) = self.sons_ages {
            update.sons_ages = sons_ages;
        }
        if let Some(daughters_ages) = self.daughters_ages {
            update.daughters_ages = daughters_ages;
        }
        if let Some(working_dependents) = self.working_dependents {
            update.working_dependents = Some(working_dependents);
        }
        if let Some(dependents_salary) = self.dependents_salary {
            update.dependents_salary = Some(dependents_salary);
        }

        let update = update.normalized();

        println!();
        (person.clone(), update.clone()).print_formatted();
        println!();
        let confirm = Confirm::new("Update member record?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.update(update).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteMember {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteMember {
    pub async fn run(&self, db: &Connection, gate: &SessionGate) -> Result<()> {
        session::require(gate)?;

        let person: Person = db.retrieve(self.id).await?;
        println!();
        person.print_formatted();
        println!();
        let confirm =
            Confirm::new("Delete this member record and its purchase history?")
                .with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }
        db.delete(person).await?;
        println!("Member record deleted.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        // 25 records, page size 10.
        assert_eq!(page_bounds(1, 10, 25), (1, 10));
        assert_eq!(page_bounds(2, 10, 25), (11, 20));
        assert_eq!(page_bounds(3, 5, 25), (21, 25));
        assert_eq!(page_bounds(1, 0, 0), (0, 0));
    }
}
