//! Derived completion figures for a request's test items. Read-only; never
//! mutates anything.

use crate::models::TestResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded to whole percent, 0 for an empty scope.
    pub percentage: u8,
}

impl Progress {
    /// Completion over the given items, optionally restricted to one
    /// department. Both counts honor the same scope.
    pub fn over(items: &[TestResult], department_id: Option<i64>) -> Self {
        let scoped = items
            .iter()
            .filter(|tr| department_id.is_none() || tr.department_id == department_id);

        let mut total = 0usize;
        let mut completed = 0usize;
        for item in scoped {
            total += 1;
            if item.status.is_completed() {
                completed += 1;
            }
        }

        let percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };

        Progress {
            completed,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({}%)", self.completed, self.total, self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestResultStatus;

    fn item(id: i64, department_id: i64, status: TestResultStatus) -> TestResult {
        TestResult {
            id,
            test_type_id: id,
            test_type_name: None,
            price: None,
            department_id: Some(department_id),
            department_name: None,
            status,
            result_text: None,
            result_filename: None,
            completed_by: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_empty_scope_is_zero_percent() {
        let progress = Progress::over(&[], None);
        assert_eq!(progress, Progress { completed: 0, total: 0, percentage: 0 });
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_unscoped_counts_all_items() {
        let items = vec![
            item(1, 5, TestResultStatus::Completed),
            item(2, 5, TestResultStatus::Pending),
            item(3, 9, TestResultStatus::Completed),
        ];
        let progress = Progress::over(&items, None);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percentage, 67);
    }

    // Scenario C: numerator and denominator restricted to one department
    #[test]
    fn test_department_scope() {
        let items = vec![
            item(1, 5, TestResultStatus::Completed),
            item(2, 5, TestResultStatus::Pending),
            item(3, 9, TestResultStatus::Completed),
        ];
        let progress = Progress::over(&items, Some(5));
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.percentage, 50);

        let empty = Progress::over(&items, Some(42));
        assert_eq!(empty.percentage, 0);
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_bounds_hold() {
        let items = vec![
            item(1, 5, TestResultStatus::Completed),
            item(2, 5, TestResultStatus::Completed),
        ];
        let progress = Progress::over(&items, None);
        assert!(progress.completed <= progress.total);
        assert!(progress.percentage <= 100);
        assert!(progress.is_complete());
        assert_eq!(progress.to_string(), "2/2 (100%)");
    }

    #[test]
    fn test_in_progress_items_do_not_count_as_completed() {
        let items = vec![item(1, 5, TestResultStatus::InProgress)];
        let progress = Progress::over(&items, None);
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.total, 1);
    }

    #[test]
    fn test_idempotent_over_same_input() {
        let items = vec![
            item(1, 5, TestResultStatus::Completed),
            item(2, 9, TestResultStatus::Pending),
        ];
        assert_eq!(Progress::over(&items, None), Progress::over(&items, None));
    }
}
