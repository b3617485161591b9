//! Domain model: money, the amortization engine, the financing lifecycle and
//! the persistence ports the application layer depends on.

pub mod command;
pub mod financing;
pub mod money;
pub mod ports;
pub mod schedule;
pub mod workflow;
