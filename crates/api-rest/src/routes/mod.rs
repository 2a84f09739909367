pub mod advisory;
pub mod analyze;
pub mod health;
pub mod patients;
pub mod reports;
