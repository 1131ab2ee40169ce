pub mod circuit_breaker;
pub mod cleanup;
pub mod simulation;
