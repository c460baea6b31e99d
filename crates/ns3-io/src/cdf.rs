//! Flow size CDF files: one `value cumulative_percent` pair per line.

use std::path::Path;

use tracekit_core::EmpiricalDist;

use crate::{field, Error, MalformedLine};

/// Reads an [`EmpiricalDist`] from a CDF file.
pub fn read_cdf(path: impl AsRef<Path>) -> Result<EmpiricalDist, Error> {
    let s = crate::read_input(path.as_ref())?;
    parse_cdf(&s)
}

/// Parses a CDF. Blank lines are ignored; any other malformed line is an error.
pub fn parse_cdf(s: &str) -> Result<EmpiricalDist, Error> {
    let mut points = Vec::new();
    for (i, line) in s.lines().enumerate() {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.is_empty() {
            continue;
        }
        let point = parse_point(&fields).map_err(|reason| Error::Cdf { line: i + 1, reason })?;
        points.push(point);
    }
    Ok(EmpiricalDist::from_breakpoints(points)?)
}

fn parse_point(fields: &[&str]) -> Result<(f64, f64), MalformedLine> {
    if fields.len() < 2 {
        return Err(MalformedLine::WrongNrFields {
            expected: 2,
            got: fields.len(),
        });
    }
    Ok((field(fields, 0)?, field(fields, 1)?))
}
