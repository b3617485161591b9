#![allow(dead_code)]

use rand::Rng;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

pub const COMMAND_HEADER: &str =
    "type, financing, farmer, role, target, principal, rate, months, method, version, period";

/// Writes a commands CSV with the standard header followed by `rows`.
pub fn commands_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "{COMMAND_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// A loan with principal in [100, 5_000_000], rate in [0, 5%] and up to 30 years.
pub fn random_loan<R: Rng>(rng: &mut R) -> (Decimal, Decimal, u32) {
    let principal = Decimal::new(rng.gen_range(10_000..=500_000_000i64), 2);
    let rate = Decimal::new(rng.gen_range(0..=500i64), 4);
    let months = rng.gen_range(1..=360u32);
    (principal, rate, months)
}

/// Accumulated rounding allowed between `total_paid` and `principal + total_interest`:
/// half a cent per period plus one cent for the final rounding.
pub fn rounding_tolerance(months: u32) -> Decimal {
    Decimal::new(5, 3) * Decimal::from(months) + Decimal::new(1, 2)
}
