// Domain layer - Sales data and the pure computations over it
pub mod aggregation;
pub mod dashboard;
pub mod filter;
pub mod format;
pub mod region;
pub mod sale;
