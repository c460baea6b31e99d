//! FCT output files written by the ns-3 simulation, one completed flow per line.
//!
//! Two layouts exist. Full lines carry a priority field; reduced lines (written by the BFC
//! variant) lack it, which shifts the timing fields one position earlier. The layout of each
//! line is selected by its field count, so files mixing both are accepted.

use std::path::Path;

use tracekit_core::FctRecord;

use crate::{field, Error, MalformedLine, SkipReport};

/// Lines with at least this many fields use [`LineLayout::Full`].
pub const NR_FULL_FIELDS: usize = 13;

/// The field layout of an FCT line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLayout {
    /// `... dport priority size _ start fct standalone_fct ...`
    Full,
    /// `... dport _ size start fct standalone_fct`
    Reduced,
}

impl LineLayout {
    /// Selects the layout for a line with `nr_fields` fields.
    pub fn for_nr_fields(nr_fields: usize) -> Self {
        if nr_fields >= NR_FULL_FIELDS {
            LineLayout::Full
        } else {
            LineLayout::Reduced
        }
    }

    /// Index of the priority field, if the layout has one.
    pub fn priority(&self) -> Option<usize> {
        match self {
            LineLayout::Full => Some(6),
            LineLayout::Reduced => None,
        }
    }

    /// Indices of the start time, FCT, and standalone FCT fields.
    pub fn timing(&self) -> [usize; 3] {
        match self {
            LineLayout::Full => [9, 10, 11],
            LineLayout::Reduced => [8, 9, 10],
        }
    }

    /// The fewest fields a line of this layout can have.
    pub fn min_fields(&self) -> usize {
        self.timing()[2] + 1
    }
}

const DPORT_FIELD: usize = 5;
const SIZE_FIELD: usize = 7;

/// The contents of an FCT file.
#[derive(Debug, Clone, Default)]
pub struct FctFile {
    /// The parsed records, in file order.
    pub records: Vec<FctRecord>,
    /// Records parsed with each layout, as `(full, reduced)`.
    pub nr_by_layout: (usize, usize),
    /// Lines that could not be parsed.
    pub skipped: SkipReport,
}

/// Reads an FCT file.
pub fn read_fct_file(path: impl AsRef<Path>) -> Result<FctFile, Error> {
    let path = path.as_ref();
    let s = crate::read_input(path)?;
    let file = parse_fct_records(&s);
    file.skipped.log(path);
    log::debug!(
        "{}: {} records ({} full, {} reduced)",
        path.display(),
        file.records.len(),
        file.nr_by_layout.0,
        file.nr_by_layout.1
    );
    Ok(file)
}

/// Parses FCT records, skipping blank and malformed lines.
pub fn parse_fct_records(s: &str) -> FctFile {
    let mut file = FctFile::default();
    for (i, line) in s.lines().enumerate() {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.is_empty() {
            continue;
        }
        match parse_fct_record(&fields) {
            Ok((layout, record)) => {
                match layout {
                    LineLayout::Full => file.nr_by_layout.0 += 1,
                    LineLayout::Reduced => file.nr_by_layout.1 += 1,
                }
                file.records.push(record);
            }
            Err(e) => file.skipped.record(i + 1, e),
        }
    }
    file
}

fn parse_fct_record(fields: &[&str]) -> Result<(LineLayout, FctRecord), MalformedLine> {
    let layout = LineLayout::for_nr_fields(fields.len());
    if fields.len() < layout.min_fields() {
        return Err(MalformedLine::WrongNrFields {
            expected: layout.min_fields(),
            got: fields.len(),
        });
    }
    let priority = layout
        .priority()
        .map(|i| field(fields, i))
        .transpose()?;
    let [start, fct, ideal] = layout.timing();
    let record = FctRecord {
        dport: field(fields, DPORT_FIELD)?,
        priority,
        size: field(fields, SIZE_FIELD)?,
        start: field(fields, start)?,
        fct: field(fields, fct)?,
        ideal: field(fields, ideal)?,
    };
    Ok((layout, record))
}
