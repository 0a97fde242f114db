use chrono::NaiveDate;
use thiserror::Error;

/// One validated `<date> <weight>` line, ready to become a store entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportLine {
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportParseError {
    #[error("line {line} is malformed")]
    MalformedLine { line: usize },
}

/// Parses bulk-import text. Accepted lines are exactly
/// `yyyy/MM/dd <weight>` with one separating space; the first malformed
/// line aborts the whole batch, so nothing partial ever reaches the store.
pub struct ImportParser;

impl ImportParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> Result<Vec<ImportLine>, ImportParseError> {
        let mut parsed = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let parsed_line = Self::parse_line(line)
                .ok_or(ImportParseError::MalformedLine { line: index + 1 })?;
            parsed.push(parsed_line);
        }

        Ok(parsed)
    }

    fn parse_line(line: &str) -> Option<ImportLine> {
        let (date_part, weight_part) = line.split_once(' ')?;
        if weight_part.is_empty() || weight_part.contains(' ') {
            return None;
        }

        let date = Self::parse_date(date_part)?;
        let weight: f64 = weight_part.parse().ok()?;
        if !weight.is_finite() {
            return None;
        }

        Some(ImportLine { date, weight })
    }

    /// Zero-padded `yyyy/MM/dd` with year in [1900, 2100]. The field ranges
    /// of the import contract are checked first; a field-wise valid date
    /// that names no real day (2024/02/31) is rejected by the calendar.
    fn parse_date(s: &str) -> Option<NaiveDate> {
        let mut fields = s.split('/');
        let (year_s, month_s, day_s) = (fields.next()?, fields.next()?, fields.next()?);
        if fields.next().is_some() {
            return None;
        }

        if year_s.len() != 4 || month_s.len() != 2 || day_s.len() != 2 {
            return None;
        }
        if ![year_s, month_s, day_s]
            .iter()
            .all(|f| f.chars().all(|c| c.is_ascii_digit()))
        {
            return None;
        }

        let year: i32 = year_s.parse().ok()?;
        let month: u32 = month_s.parse().ok()?;
        let day: u32 = day_s.parse().ok()?;

        if !(1900..=2100).contains(&year)
            || !(1..=12).contains(&month)
            || !(1..=31).contains(&day)
        {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl Default for ImportParser {
    fn default() -> Self {
        Self::new()
    }
}
