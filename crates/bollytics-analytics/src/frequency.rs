//! Day-of-week × hour-of-day activity histogram.

use bollytics_core::FrequencyCell;
use bollytics_db::FrequencyRow;
use serde::Serialize;

pub const DAYS: usize = 7;
pub const HOURS: usize = 24;

/// Post counts for every UTC `(day, hour)` bucket. Day 0 is Sunday.
///
/// Always complete: buckets without posts hold `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyGrid {
    counts: [[i64; HOURS]; DAYS],
}

impl Default for FrequencyGrid {
    fn default() -> Self {
        Self {
            counts: [[0; HOURS]; DAYS],
        }
    }
}

impl FrequencyGrid {
    /// Zero-fills a grid and adds every grouped row to its bucket.
    ///
    /// Rows outside `0..7` × `0..24` are dropped with a warning; the query
    /// that produces them cannot emit such values.
    #[must_use]
    pub fn from_rows(rows: &[FrequencyRow]) -> Self {
        let mut grid = Self::default();
        for row in rows {
            match (usize::try_from(row.day), usize::try_from(row.hour)) {
                (Ok(day), Ok(hour)) if day < DAYS && hour < HOURS => {
                    grid.counts[day][hour] += row.post_count;
                }
                _ => tracing::warn!(
                    day = row.day,
                    hour = row.hour,
                    "frequency row outside the 7x24 grid"
                ),
            }
        }
        grid
    }

    #[must_use]
    pub fn get(&self, day: usize, hour: usize) -> Option<i64> {
        self.counts.get(day).and_then(|hours| hours.get(hour)).copied()
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.counts.iter().flatten().sum()
    }

    /// All 168 buckets, day-major.
    #[must_use]
    pub fn cells(&self) -> Vec<FrequencyCell> {
        let mut cells = Vec::with_capacity(DAYS * HOURS);
        for (day, hours) in (0u8..).zip(self.counts.iter()) {
            for (hour, &count) in (0u8..).zip(hours.iter()) {
                cells.push(FrequencyCell { hour, day, count });
            }
        }
        cells
    }

    #[must_use]
    pub fn rows(&self) -> &[[i64; HOURS]; DAYS] {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: i32, hour: i32, post_count: i64) -> FrequencyRow {
        FrequencyRow {
            day,
            hour,
            post_count,
        }
    }

    #[test]
    fn empty_input_is_a_full_zero_grid() {
        let grid = FrequencyGrid::from_rows(&[]);
        let cells = grid.cells();
        assert_eq!(cells.len(), 168);
        assert!(cells.iter().all(|c| c.count == 0));
        assert_eq!(grid.total(), 0);
    }

    #[test]
    fn rows_land_in_their_buckets() {
        let grid = FrequencyGrid::from_rows(&[row(6, 18, 3), row(0, 0, 1), row(2, 23, 5)]);

        assert_eq!(grid.get(6, 18), Some(3));
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(2, 23), Some(5));
        assert_eq!(grid.get(1, 1), Some(0));
        assert_eq!(grid.get(7, 0), None);
    }

    #[test]
    fn total_matches_sum_of_rows() {
        let rows = [row(1, 9, 4), row(1, 10, 2), row(5, 21, 7)];
        let grid = FrequencyGrid::from_rows(&rows);
        assert_eq!(grid.total(), 13);
        assert_eq!(grid.cells().iter().map(|c| c.count).sum::<i64>(), 13);
    }

    #[test]
    fn out_of_range_rows_are_ignored() {
        let grid = FrequencyGrid::from_rows(&[row(7, 0, 9), row(0, 24, 9), row(-1, 3, 9)]);
        assert_eq!(grid.total(), 0);
    }

    #[test]
    fn cells_are_day_major() {
        let cells = FrequencyGrid::from_rows(&[row(1, 0, 2)]).cells();
        assert_eq!(
            cells[24],
            FrequencyCell {
                hour: 0,
                day: 1,
                count: 2
            }
        );
        assert_eq!(cells[167].day, 6);
        assert_eq!(cells[167].hour, 23);
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let grid = FrequencyGrid::from_rows(&[row(0, 1, 1)]);
        let value = serde_json::to_value(&grid).unwrap();
        let days = value.as_array().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].as_array().unwrap().len(), 24);
        assert_eq!(days[0][1], 1);
    }
}
