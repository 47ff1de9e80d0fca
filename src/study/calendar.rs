use chrono::{Datelike, NaiveDate};

/// A month laid out Monday-first, the way the calendar view draws it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthGrid {
    first: NaiveDate,
}

impl MonthGrid {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(month: &str) -> Result<Self, String> {
        NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
            .map(Self::containing)
            .map_err(|e| format!("Invalid month '{month}' (expected YYYY-MM): {e}"))
    }

    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// Blank cells before the 1st, counting from Monday.
    pub fn leading_blanks(&self) -> usize {
        self.first.weekday().num_days_from_monday() as usize
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first;
        next.signed_duration_since(self.first).num_days() as u32
    }

    pub fn next(&self) -> Self {
        let (y, m) = if self.first.month() == 12 {
            (self.first.year() + 1, 1)
        } else {
            (self.first.year(), self.first.month() + 1)
        };
        Self::from_ym(y, m).unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        let (y, m) = if self.first.month() == 1 {
            (self.first.year() - 1, 12)
        } else {
            (self.first.year(), self.first.month() - 1)
        };
        Self::from_ym(y, m).unwrap_or(*self)
    }

    fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// Grid cells in row-major order; `None` marks a leading blank.
    pub fn cells(&self) -> Vec<Option<NaiveDate>> {
        let mut cells = vec![None; self.leading_blanks()];
        cells.extend(self.first.iter_days().take(self.days_in_month() as usize).map(Some));
        cells
    }
}
