pub mod reporting;
pub mod use_cases;
