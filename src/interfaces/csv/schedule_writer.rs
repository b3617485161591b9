use crate::domain::schedule::ScheduleResult;
use crate::error::Result;
use std::io::Write;

/// Writes schedule rows as `period,payment,interest,principal,remaining`.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_schedule(&mut self, schedule: &ScheduleResult) -> Result<()> {
        if schedule.rows.is_empty() {
            self.writer
                .write_record(["period", "payment", "interest", "principal", "remaining"])?;
        }
        for row in &schedule.rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
