pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::Claims;
pub use jwt::TokenPair;
pub use password::{Argon2PasswordHasher, PasswordHasher};
