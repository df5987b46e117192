pub mod height;
pub mod processor;
