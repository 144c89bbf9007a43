// Tabular helpers shared by the cleaning pipeline
pub mod table;

// Suspicious order detection
pub mod order_processor;

// Repeat-offender views
pub mod aggregation;
pub mod report;
