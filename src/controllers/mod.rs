pub mod batch;
pub mod report;
