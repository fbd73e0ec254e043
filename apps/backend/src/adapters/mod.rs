pub mod links_sea;
pub mod users_sea;

pub use links_sea::LinkRepoSea;
pub use users_sea::UserRepoSea;
