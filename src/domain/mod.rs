pub mod batch;
pub mod voice;
