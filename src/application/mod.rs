//! Application layer orchestrating financing operations.
//!
//! This module defines the `FinancingService` which validates lifecycle
//! transitions against the workflow table, persists them through the storage
//! ports and derives installment plans from the amortization engine.

pub mod service;
