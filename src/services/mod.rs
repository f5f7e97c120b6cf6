//! Business logic services.

pub mod reports;
pub mod results;

pub use reports::create_report_if_enough_data;
pub use results::{ResultFields, save_result};
