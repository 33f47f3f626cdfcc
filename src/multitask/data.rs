/// Number of input features per example.
pub const FEATURE_COUNT: usize = 4;

/// Width of a raw dataset row: the features plus the two labels.
pub const ROW_WIDTH: usize = FEATURE_COUNT + 2;

/// One observed student: four raw features plus the two training labels.
///
/// Examples are immutable once drawn from a dataset; training consumes
/// them in the order the dataset gives them.
#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub study_hours: f64,
    pub sleep_hours: f64,
    pub attendance: f64,
    pub previous_score: f64,
    /// Continuous outcome in [1.0, 5.0].
    pub score: f64,
    /// Pass/fail outcome.
    pub passed: bool,
}

impl TrainingExample {
    /// Builds an example from a raw dataset row
    /// `[study_hours, sleep_hours, attendance, previous_score, score, passed]`,
    /// where `passed` is any non-zero value.
    ///
    /// # Examples
    /// ```
    /// # use mtnnet::multitask::TrainingExample;
    /// let example = TrainingExample::from_row([7.0, 8.0, 95.0, 4.5, 4.7, 1.0]);
    /// assert!(example.passed);
    /// ```
    pub fn from_row(row: [f64; ROW_WIDTH]) -> TrainingExample {
        TrainingExample {
            study_hours: row[0],
            sleep_hours: row[1],
            attendance: row[2],
            previous_score: row[3],
            score: row[4],
            passed: row[5] != 0.0,
        }
    }

    /// Raw feature vector in network input order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.study_hours,
            self.sleep_hours,
            self.attendance,
            self.previous_score,
        ]
    }

    /// Classification target: 1.0 for passed, 0.0 otherwise.
    pub fn pass_label(&self) -> f64 {
        if self.passed {
            1.0
        } else {
            0.0
        }
    }
}

/// Returns the bundled 25-student training table.
pub fn reference_dataset() -> Vec<TrainingExample> {
    const ROWS: [[f64; ROW_WIDTH]; 25] = [
        [7.0, 8.0, 95.0, 4.5, 4.7, 1.0],
        [4.0, 6.0, 70.0, 3.0, 3.2, 1.0],
        [9.0, 7.0, 98.0, 4.8, 4.9, 1.0],
        [3.0, 5.0, 60.0, 2.5, 2.7, 0.0],
        [8.0, 8.0, 92.0, 4.3, 4.5, 1.0],
        [5.0, 7.0, 75.0, 3.5, 3.6, 1.0],
        [10.0, 8.0, 100.0, 5.0, 5.0, 1.0],
        [2.0, 4.0, 50.0, 2.0, 2.2, 0.0],
        [6.0, 7.0, 85.0, 4.0, 4.1, 1.0],
        [8.0, 6.0, 88.0, 4.2, 4.3, 1.0],
        [4.0, 5.0, 65.0, 2.8, 3.0, 1.0],
        [9.0, 9.0, 96.0, 4.6, 4.8, 1.0],
        [7.0, 7.0, 90.0, 4.2, 4.4, 1.0],
        [3.0, 6.0, 55.0, 2.3, 2.5, 0.0],
        [10.0, 7.0, 98.0, 4.7, 4.9, 1.0],
        [5.0, 8.0, 80.0, 3.7, 3.9, 1.0],
        [6.0, 6.0, 82.0, 3.9, 4.0, 1.0],
        [8.0, 9.0, 94.0, 4.5, 4.6, 1.0],
        [4.0, 4.0, 68.0, 3.1, 3.3, 1.0],
        [7.0, 8.0, 87.0, 4.1, 4.2, 1.0],
        [2.0, 5.0, 55.0, 2.4, 2.6, 0.0],
        [3.0, 4.0, 45.0, 1.8, 2.0, 0.0],
        [5.0, 6.0, 72.0, 3.2, 3.4, 1.0],
        [6.0, 8.0, 88.0, 4.0, 4.2, 1.0],
        [4.0, 7.0, 78.0, 3.4, 3.6, 1.0],
    ];

    ROWS.iter().map(|&row| TrainingExample::from_row(row)).collect()
}
