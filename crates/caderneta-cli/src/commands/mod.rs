mod auth;
pub use auth::Auth;

mod members;
pub use members::Members;

mod purchases;
pub use purchases::Purchases;
