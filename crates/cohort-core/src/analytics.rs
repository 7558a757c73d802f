//! # Grade Analytics
//!
//! Average grade and top scorers over a roster snapshot.
//!
//! Every student's current grade counts, including the unset sentinel.

use crate::Student;
use crate::primitives::TOP_SCORER_DIVISOR;
use crate::types::AnalyticsError;

/// Precision kept on the scaled mean before the final rounding.
const SNAP_SCALE: f64 = 1_000_000.0;

/// Mean grade of the roster, rounded half-up to one decimal.
#[allow(clippy::float_arithmetic)]
pub fn mean_grade(roster: &[Student]) -> Result<f64, AnalyticsError> {
    if roster.is_empty() {
        return Err(AnalyticsError::NoStudentsFound);
    }

    let total: f64 = roster.iter().map(|s| s.grade).sum();
    let tenths = total / roster.len() as f64 * 10.0;

    // Snap binary representation error (23.499999999999996) before rounding half-up.
    let tenths = (tenths * SNAP_SCALE).round() / SNAP_SCALE;
    Ok(tenths.round() / 10.0)
}

/// Average grade rendered as "Average grade is {value}".
pub fn average_grade(roster: &[Student]) -> Result<String, AnalyticsError> {
    let mean = mean_grade(roster)?;
    Ok(format!("Average grade is {:.1}", mean))
}

/// How many students count as top scorers in a roster of `roster_size`.
///
/// One in four, rounded down, never fewer than one.
#[must_use]
pub const fn top_scorer_count(roster_size: usize) -> usize {
    let count = roster_size / TOP_SCORER_DIVISOR;
    if count == 0 { 1 } else { count }
}

/// Highest graded students, best first.
///
/// Ties keep their roster order.
pub fn top_scoring_students(roster: &[Student]) -> Result<Vec<&Student>, AnalyticsError> {
    if roster.is_empty() {
        return Err(AnalyticsError::NoStudentsFound);
    }

    let mut ranked: Vec<&Student> = roster.iter().collect();
    ranked.sort_by(|a, b| b.grade.total_cmp(&a.grade));
    ranked.truncate(top_scorer_count(roster.len()));

    Ok(ranked)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn roster(grades: &[f64]) -> Vec<Student> {
        grades
            .iter()
            .enumerate()
            .map(|(i, &grade)| {
                Student::new(
                    format!("First{}", i),
                    format!("Last{}", i),
                    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
                    format!("student{}@school.se", i),
                )
                .with_grade(grade)
            })
            .collect()
    }

    const EIGHT: [f64; 8] = [2.5, 4.5, 1.2, 3.7, 2.3, 5.0, 4.9, 2.8];

    #[test]
    fn average_of_empty_roster() {
        assert_eq!(average_grade(&[]), Err(AnalyticsError::NoStudentsFound));
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(
            average_grade(&roster(&[2.5, 4.5, 1.2])).as_deref(),
            Ok("Average grade is 2.7")
        );
    }

    #[test]
    fn average_keeps_trailing_zero() {
        assert_eq!(
            average_grade(&roster(&[3.0, 3.0])).as_deref(),
            Ok("Average grade is 3.0")
        );
    }

    #[test]
    fn average_rounds_half_up() {
        // (2.0 + 2.5) / 2 = 2.25
        assert_eq!(mean_grade(&roster(&[2.0, 2.5])), Ok(2.3));
    }

    #[test]
    fn average_rounds_half_up_on_inexact_means() {
        // 2.3 + 2.4 sums to 4.699999999999999 in binary
        assert_eq!(mean_grade(&roster(&[2.3, 2.4])), Ok(2.4));
        assert_eq!(mean_grade(&roster(&[4.6, 4.7])), Ok(4.7));
        assert_eq!(mean_grade(&roster(&[0.1, 0.2])), Ok(0.2));
        assert_eq!(
            average_grade(&roster(&[1.1, 1.2])).as_deref(),
            Ok("Average grade is 1.2")
        );
    }

    #[test]
    fn average_below_half_rounds_down() {
        // (2.3 + 2.3 + 2.4) / 3 = 2.333...
        assert_eq!(mean_grade(&roster(&[2.3, 2.3, 2.4])), Ok(2.3));
    }

    #[test]
    fn unset_grades_count_as_zero() {
        let mut students = roster(&[4.0]);
        students.extend(roster(&[0.0]));
        assert_eq!(mean_grade(&students), Ok(2.0));
    }

    #[test]
    fn top_scorers_of_empty_roster() {
        assert_eq!(
            top_scoring_students(&[]).err(),
            Some(AnalyticsError::NoStudentsFound)
        );
    }

    #[test]
    fn top_scorers_of_eight() {
        let students = roster(&EIGHT);
        let top = top_scoring_students(&students).unwrap_or_default();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].grade, 5.0);
        assert_eq!(top[1].grade, 4.9);
        assert_eq!(top[0].email, "student5@school.se");
        assert_eq!(top[1].email, "student6@school.se");
    }

    #[test]
    fn top_scorer_count_small_rosters() {
        for n in 1..=4 {
            assert_eq!(top_scorer_count(n), 1, "roster of {}", n);
        }
        assert_eq!(top_scorer_count(7), 1);
        assert_eq!(top_scorer_count(8), 2);
        assert_eq!(top_scorer_count(12), 3);
    }

    #[test]
    fn ties_keep_roster_order() {
        let students = roster(&[3.0, 4.0, 4.0, 1.0, 4.0, 2.0, 0.5, 0.0]);
        let top = top_scoring_students(&students).unwrap_or_default();

        let emails: Vec<&str> = top.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails, vec!["student1@school.se", "student2@school.se"]);
    }

    #[test]
    fn single_student_is_top_scorer() {
        let students = roster(&[1.0]);
        assert_eq!(top_scoring_students(&students).map(|t| t.len()), Ok(1));
    }
}
