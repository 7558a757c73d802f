//! # Property-Based Tests
//!
//! These tests check the arithmetic and idempotence invariants of the
//! planner and the analytics with proptest.

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_arithmetic)]

use chrono::NaiveDate;
use cohort_core::{
    GroupPlan, PlanError, Student, average_grade, parse_grade, plan_by_group_count,
    plan_by_group_size, top_scorer_count, top_scoring_students,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn roster(grades: &[f64]) -> Vec<Student> {
    grades
        .iter()
        .enumerate()
        .map(|(i, &grade)| {
            Student::new(
                "First",
                "Last",
                NaiveDate::from_ymd_opt(2001, 5, 17).unwrap(),
                format!("s{}@school.se", i),
            )
            .with_grade(grade)
        })
        .collect()
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Fewer than two groups is always rejected, whatever the roster size.
    #[test]
    fn too_few_groups_for_any_roster(total in 0usize..10_000, groups in 0usize..2) {
        prop_assert_eq!(plan_by_group_count(total, groups), Err(PlanError::TooFewGroups));
    }

    /// Groups smaller than two are always rejected.
    #[test]
    fn too_small_groups_for_any_roster(total in 0usize..10_000, size in 0usize..2) {
        prop_assert_eq!(plan_by_group_size(total, size), Err(PlanError::GroupTooSmall));
    }

    /// A successful count plan accounts for every student.
    #[test]
    fn count_plan_accounts_for_everyone(total in 0usize..10_000, groups in 2usize..500) {
        if let Ok(plan) = plan_by_group_count(total, groups) {
            prop_assert_eq!(
                plan.group_count() * plan.students_per_group() + plan.remainder(),
                total
            );
            prop_assert!(plan.students_per_group() >= 2);
            prop_assert!(plan.remainder() < groups);
        }
    }

    /// A successful size plan accounts for every student.
    #[test]
    fn size_plan_accounts_for_everyone(total in 0usize..10_000, size in 2usize..500) {
        if let Ok(plan) = plan_by_group_size(total, size) {
            prop_assert_eq!(
                plan.group_count() * plan.students_per_group() + plan.remainder(),
                total
            );
            prop_assert!(plan.group_count() >= 2);
            prop_assert!(plan.remainder() < size);
        }
    }

    /// Planning twice with the same inputs gives the same outcome.
    #[test]
    fn planners_are_idempotent(total in 0usize..1_000, param in 0usize..100) {
        prop_assert_eq!(plan_by_group_count(total, param), plan_by_group_count(total, param));
        prop_assert_eq!(plan_by_group_size(total, param), plan_by_group_size(total, param));
    }

    /// Count-mode messages mention the hanging students only when there are some.
    #[test]
    fn hanging_suffix_matches_remainder(total in 4usize..1_000, groups in 2usize..50) {
        if let Ok(plan) = plan_by_group_count(total, groups) {
            let message = plan.to_string();
            prop_assert_eq!(message.contains("hanging"), plan.remainder() > 0);
            if let GroupPlan::ByCount { remainder: 1, .. } = plan {
                prop_assert!(message.ends_with("1 student hanging"));
            }
        }
    }

    /// The average lies within the grade range and is stable across calls.
    #[test]
    fn average_in_range_and_idempotent(grades in vec(0u8..=50, 1..40)) {
        let grades: Vec<f64> = grades.iter().map(|&g| f64::from(g) / 10.0).collect();
        let students = roster(&grades);

        let first = average_grade(&students).unwrap();
        let second = average_grade(&students).unwrap();
        prop_assert_eq!(&first, &second);

        let value: f64 = first.trim_start_matches("Average grade is ").parse().unwrap();
        prop_assert!((0.0..=5.0).contains(&value));
    }

    /// Top scorers are sorted and outrank everyone left out.
    #[test]
    fn top_scorers_outrank_the_rest(grades in vec(0u8..=50, 1..40)) {
        let grades: Vec<f64> = grades.iter().map(|&g| f64::from(g) / 10.0).collect();
        let students = roster(&grades);
        let top = top_scoring_students(&students).unwrap();

        prop_assert_eq!(top.len(), top_scorer_count(students.len()));
        prop_assert!(top.windows(2).all(|w| w[0].grade >= w[1].grade));

        let cutoff = top.last().map(|s| s.grade).unwrap();
        let above_cutoff = students.iter().filter(|s| s.grade > cutoff).count();
        prop_assert!(above_cutoff <= top.len());
    }

    /// Every in-range decimal parses back to itself.
    #[test]
    fn grades_in_range_parse(tenths in 0u8..=50) {
        let value = f64::from(tenths) / 10.0;
        prop_assert_eq!(parse_grade(&format!("{:.1}", value)), Ok(value));
    }
}
