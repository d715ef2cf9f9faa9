pub mod error;
pub mod executor;
pub mod federator;
pub mod references;

pub use executor::QueryExecutor;
pub use federator::{DEFAULT_ROW_CAP, ExecutionPath, QueryFederator};
