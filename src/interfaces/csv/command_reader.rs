//! Batch input for the `process` subcommand.
//!
//! A commands file has one header row naming the columns of
//! [`FinancingCommand`]. Columns a command type does not use may be left blank
//! or cut off at the end of the row.

use crate::domain::command::FinancingCommand;
use crate::error::{FinancingError, Result};
use std::io::Read;

pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Commands in file order. A row that does not parse is yielded as an
    /// error and the rows after it are still read.
    pub fn commands(self) -> impl Iterator<Item = Result<FinancingCommand>> {
        self.reader
            .into_deserialize()
            .map(|row| row.map_err(FinancingError::from))
    }
}
