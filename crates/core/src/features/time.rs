use super::FeatureExtractor;
use crate::dataset::Table;
use crate::error::Result;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Weekday,
    Month,
    Season,
    Daytime,
}

impl TimeUnit {
    fn labels(&self) -> &'static [&'static str] {
        match self {
            TimeUnit::Weekday => &[
                "monday",
                "tuesday",
                "wednesday",
                "thursday",
                "friday",
                "saturday",
                "sunday",
            ],
            TimeUnit::Month => &[
                "january",
                "february",
                "march",
                "april",
                "may",
                "june",
                "july",
                "august",
                "september",
                "october",
                "november",
                "december",
            ],
            TimeUnit::Season => &["winter", "spring", "summer", "fall"],
            TimeUnit::Daytime => &["night", "morning", "afternoon", "evening"],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TimeUnit::Weekday => "weekday",
            TimeUnit::Month => "month",
            TimeUnit::Season => "season",
            TimeUnit::Daytime => "daytime",
        }
    }

    /// Bucket index of a cell, `None` when it cannot be parsed.
    fn bucket(&self, cell: &str) -> Option<usize> {
        match self {
            TimeUnit::Weekday => {
                parse_date(cell).map(|d| d.weekday().num_days_from_monday() as usize)
            }
            TimeUnit::Month => parse_date(cell).map(|d| d.month0() as usize),
            TimeUnit::Season => parse_date(cell).map(|d| match d.month() {
                12 | 1 | 2 => 0,
                3..=5 => 1,
                6..=8 => 2,
                _ => 3,
            }),
            TimeUnit::Daytime => parse_time(cell).map(|t| t.hour() as usize / 6),
        }
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let trimmed = cell.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_time(cell: &str) -> Option<NaiveTime> {
    let trimmed = cell.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

/// One-hot encoding of the posting date or time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotTime {
    pub column: String,
    pub unit: TimeUnit,
}

impl OneHotTime {
    pub fn new(column: &str, unit: TimeUnit) -> Self {
        Self {
            column: column.to_string(),
            unit,
        }
    }
}

impl FeatureExtractor for OneHotTime {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        format!("{}_{}", self.column, self.unit.name())
    }

    fn feature_names(&self) -> Vec<String> {
        let prefix = self.feature_name();
        self.unit
            .labels()
            .iter()
            .map(|l| format!("{prefix}_{l}"))
            .collect()
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        let width = self.unit.labels().len();
        let mut skipped = 0usize;
        let rows = table
            .column(&self.column)?
            .iter()
            .map(|cell| {
                let mut row = vec![0.0; width];
                match self.unit.bucket(cell) {
                    Some(i) => row[i] = 1.0,
                    None => skipped += 1,
                }
                row
            })
            .collect();
        if skipped > 0 {
            warn!(
                "{}: {} unparseable cells encoded as all zeros",
                self.feature_name(),
                skipped
            );
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns(vec![
            ("date", vec!["2021-04-14", "2020-12-25 10:00:00", "soon"]),
            ("time", vec!["05:59:59", "18:00", "23:10:00"]),
        ])
    }

    #[test]
    fn weekday_one_hot() {
        let rows = OneHotTime::new("date", TimeUnit::Weekday)
            .transform(&table())
            .unwrap();
        // Wednesday, Friday, unparseable
        assert_eq!(rows[0][2], 1.0);
        assert_eq!(rows[1][4], 1.0);
        assert!(rows[2].iter().all(|v| *v == 0.0));
        assert!(rows.iter().all(|r| r.len() == 7));
    }

    #[test]
    fn december_is_winter() {
        let rows = OneHotTime::new("date", TimeUnit::Season)
            .transform(&table())
            .unwrap();
        assert_eq!(rows[0], vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(rows[1], vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn daytime_buckets_are_half_open() {
        let rows = OneHotTime::new("time", TimeUnit::Daytime)
            .transform(&table())
            .unwrap();
        assert_eq!(rows[0], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(rows[1], vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(rows[2], vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn month_names() {
        let extractor = OneHotTime::new("date", TimeUnit::Month);
        let names = extractor.feature_names();
        assert_eq!(names.len(), 12);
        assert_eq!(names[3], "date_month_april");
        let rows = extractor.transform(&table()).unwrap();
        assert_eq!(rows[0][3], 1.0);
        assert_eq!(rows[1][11], 1.0);
    }
}
