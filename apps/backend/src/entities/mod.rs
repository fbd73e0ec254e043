pub mod links;
pub mod users;

pub use links::Entity as Links;
pub use links::Model as LinkModel;
pub use users::Entity as Users;
pub use users::Model as UserModel;
