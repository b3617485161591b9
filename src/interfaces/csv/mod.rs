//! CSV adapters for batch commands, schedules and financing summaries.

pub mod command_reader;
pub mod financing_writer;
pub mod schedule_writer;
