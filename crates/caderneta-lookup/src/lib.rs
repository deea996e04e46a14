mod address;
pub use address::{Address, AddressLookup, LookupError};
