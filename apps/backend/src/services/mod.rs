//! Service layer: business rules over the repository and cache seams.

pub mod auth;
pub mod links;
pub mod profiles;

pub use auth::AuthService;
pub use links::LinkService;
pub use profiles::ProfileService;
