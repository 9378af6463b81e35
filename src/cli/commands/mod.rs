pub mod authorize;
pub mod migrate;
pub mod policies;
pub mod token;
