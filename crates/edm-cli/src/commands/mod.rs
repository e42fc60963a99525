pub mod analyze;
pub mod cagr;
pub mod generate;
