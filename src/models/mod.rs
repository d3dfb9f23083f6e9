pub mod comparison;
pub mod job;
pub mod submission;
