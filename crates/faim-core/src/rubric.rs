//! # Rubric Recalibrator
//!
//! Removes non-observable criteria from a rubric.
//!
//! Categories are never dropped, even when recalibration empties them; an
//! empty criteria list is a valid, fully observable category.

use crate::types::RubricCategory;

/// Keep only observable criteria, preserving category identity and order.
///
/// Pure and idempotent: `recalibrate(&recalibrate(r)) == recalibrate(r)`.
#[must_use]
pub fn recalibrate(rubric: &[RubricCategory]) -> Vec<RubricCategory> {
    rubric
        .iter()
        .map(|category| RubricCategory {
            id: category.id.clone(),
            label: category.label.clone(),
            criteria: category
                .criteria
                .iter()
                .filter(|c| c.observable)
                .cloned()
                .collect(),
        })
        .collect()
}

/// True when every criterion in the rubric is observable.
#[must_use]
pub fn is_calibrated(rubric: &[RubricCategory]) -> bool {
    rubric
        .iter()
        .flat_map(|category| &category.criteria)
        .all(|c| c.observable)
}

/// Number of criteria recalibration would remove.
#[must_use]
pub fn non_observable_count(rubric: &[RubricCategory]) -> usize {
    rubric
        .iter()
        .flat_map(|category| &category.criteria)
        .filter(|c| !c.observable)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::default_rubric;
    use crate::types::Criterion;

    #[test]
    fn removes_only_non_observable() {
        let rubric = default_rubric();
        let cleaned = recalibrate(&rubric);

        assert_eq!(cleaned.len(), rubric.len());
        assert_eq!(cleaned[0].criteria, vec![Criterion::new("States 2–3 goals explicitly", true)]);
        assert_eq!(cleaned[1].criteria, vec![Criterion::new("Explains 3+ core concepts", true)]);
        assert!(is_calibrated(&cleaned));
        assert!(!is_calibrated(&rubric));
        assert_eq!(non_observable_count(&rubric), 2);
    }

    #[test]
    fn keeps_emptied_categories() {
        let rubric = vec![RubricCategory {
            id: "tone".to_string(),
            label: "Tone".to_string(),
            criteria: vec![Criterion::new("Sounds authoritative", false)],
        }];

        let cleaned = recalibrate(&rubric);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].id, "tone");
        assert_eq!(cleaned[0].label, "Tone");
        assert!(cleaned[0].criteria.is_empty());
    }

    #[test]
    fn idempotent() {
        let once = recalibrate(&default_rubric());
        assert_eq!(recalibrate(&once), once);
    }

    #[test]
    fn input_untouched() {
        let rubric = default_rubric();
        let _ = recalibrate(&rubric);
        assert_eq!(rubric, default_rubric());
    }
}
