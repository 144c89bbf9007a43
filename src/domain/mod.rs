// Core trade and price bar types
pub mod types;

// Port interfaces
pub mod ports;

// Suspicion rules
pub mod rules;

// Domain-specific error types
pub mod errors;
