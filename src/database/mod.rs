pub mod executor;
pub mod manager;
pub mod owners;
pub mod role_store;

pub use executor::PgStatementExecutor;
pub use manager::{DatabaseError, DatabaseManager};
pub use owners::load_owner_index;
pub use role_store::PgRoleStore;
