pub mod error;
pub mod report;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use report::{Report, year_bounds};
pub use structs::{CaregiverGroup, VisitRow};
