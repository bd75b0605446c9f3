pub mod audit;
pub mod scan;
