use caderneta_data::{Person, Purchase};
use caderneta_format::{
    display_date,
    display_date_or_placeholder,
    format_currency,
    format_currency_or_zero,
};

macro_rules! next_attr {
    ($old:expr, $new:expr) => {
        if $old != $new {
            format!(" -> {}", $new)
        } else {
            "".to_string()
        }
    };
}

pub trait PrintFormatted {
    fn print_formatted(&self);
}

fn placeholder<T: ToString>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Label/value rows of the detail view, shared by the read-only
/// rendering and the update diff.
fn person_rows(person: &Person) -> Vec<(&'static str, String)> {
    vec![
        ("Name:", person.name.clone()),
        ("Age:", placeholder(&person.age)),
        ("Years as member:", placeholder(&person.years_as_member)),
        ("Record #:", placeholder(&person.record_number)),
        ("Marital status:", person.marital_status.to_string()),
        ("Birth date:", display_date_or_placeholder(person.birth_date)),
        ("Spouse name:", placeholder(&person.spouse_name)),
        ("Spouse age:", placeholder(&person.spouse_age)),
        (
            "Spouse years as member:",
            placeholder(&person.spouse_years_as_member),
        ),
        (
            "Spouse birth date:",
            display_date_or_placeholder(person.spouse_birth_date),
        ),
        ("Congregation:", placeholder(&person.congregation)),
        ("CEP:", placeholder(&person.postal_code)),
        ("Street:", placeholder(&person.street)),
        ("Number:", placeholder(&person.house_number)),
        ("Neighborhood:", placeholder(&person.neighborhood)),
        ("City:", placeholder(&person.city)),
        ("State:", placeholder(&person.state)),
        ("Address:", placeholder(&person.address)),
        ("Rent:", format_currency_or_zero(person.rent)),
        ("Salary:", format_currency_or_zero(person.salary)),
        ("Pension:", format_currency_or_zero(person.pension)),
        ("Monthly dues:", format_currency_or_zero(person.monthly_dues)),
        ("Has dependents:", yes_no(person.has_dependents)),
        (
            "Dependents at home:",
            placeholder(&person.dependents_at_home),
        ),
        ("Sons ages:", person.sons_ages.to_string()),
        ("Daughters ages:", person.daughters_ages.to_string()),
        ("Sons:", person.sons_count.to_string()),
        ("Daughters:", person.daughters_count.to_string()),
        (
            "Working dependents:",
            placeholder(&person.working_dependents),
        ),
        (
            "Dependents salary:",
            format_currency_or_zero(person.dependents_salary),
        ),
    ]
}

impl PrintFormatted for Person {
    fn print_formatted(&self) {
        for (label, value) in person_rows(self) {
            println!("{:<24}{}", label, value);
        }
    }
}

impl PrintFormatted for (Person, Person) {
    fn print_formatted(&self) {
        let (old, new) = self;
        for ((label, old_value), (_, new_value)) in
            person_rows(old).iter().zip(person_rows(new).iter())
        {
            let next = next_attr!(old_value, new_value);
            println!("{:<24}{}{}", label, old_value, next);
        }
    }
}

impl PrintFormatted for Vec<Person> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:>4}\t{:<10}\t{:<10}\t{:<16}\t{:<32}",
            "ID", "Name", "Age", "Status", "Record #", "Congregation", "Address",
        );
        println!("{:-<120}", "-");
        for person in self {
            println!(
                "{:>4}\t{:<24}\t{:>4}\t{:<10}\t{:<10}\t{:<16}\t{:<32}",
                person.id,
                person.name,
                placeholder(&person.age),
                person.marital_status,
                placeholder(&person.record_number),
                placeholder(&person.congregation),
                placeholder(&person.address),
            );
        }
        if self.is_empty() {
            println!("No records.");
        }
    }
}

fn purchase_rows(purchase: &Purchase) -> Vec<(&'static str, String)> {
    vec![
        ("Date:", display_date(purchase.date)),
        ("Description:", purchase.description.clone()),
        // Derived from the stored number, never from display text.
        ("Amount:", format_currency(purchase.amount)),
    ]
}

impl PrintFormatted for Purchase {
    fn print_formatted(&self) {
        for (label, value) in purchase_rows(self) {
            println!("{:<24}{}", label, value);
        }
    }
}

impl PrintFormatted for (Purchase, Purchase) {
    fn print_formatted(&self) {
        let (old, new) = self;
        for ((label, old_value), (_, new_value)) in
            purchase_rows(old).iter().zip(purchase_rows(new).iter())
        {
            let next = next_attr!(old_value, new_value);
            println!("{:<24}{}{}", label, old_value, next);
        }
    }
}

impl PrintFormatted for Vec<Purchase> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<12}\t{:<40}\t{:>14}",
            "ID", "Date", "Description", "Amount",
        );
        println!("{:-<80}", "-");
        for purchase in self {
            println!(
                "{:>4}\t{:<12}\t{:<40}\t{:>14}",
                purchase.id,
                display_date(purchase.date),
                purchase.description,
                format_currency(purchase.amount),
            );
        }
        if self.is_empty() {
            println!("No purchases.");
        }
    }
}
