pub mod connection;
pub use connection::{Connection, TestHandle};

pub mod results;
pub mod schema;

pub mod persons;
pub mod purchases;
pub mod sessions;
pub mod users;
