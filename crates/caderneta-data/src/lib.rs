// Operations
mod operations;
pub use operations::*;

// Models
mod persons;
pub use persons::*;

mod purchases;
pub use purchases::*;

mod users;
pub use users::*;

mod sessions;
pub use sessions::*;
