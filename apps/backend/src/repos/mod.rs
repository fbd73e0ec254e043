pub mod links;
pub mod users;

pub use links::LinkRepo;
pub use users::UserRepo;
