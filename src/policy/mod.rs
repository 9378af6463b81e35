// Row-level access policies: one ordered guard chain per (table, operation)

pub mod error;
pub mod evaluator;
pub mod registry;
pub mod row;
pub mod rule;
pub mod table;

pub use error::PolicyError;
pub use evaluator::Authorizer;
pub use registry::PolicyRegistry;
pub use row::{OwnerIndex, ProtectedRow};
pub use rule::{Guard, PolicyPredicate, Step, Verdict};
pub use table::Table;
