//! Dominant attribute resolution
//!
//! Reduces one image's observations to a single winner per exclusive group,
//! followed by every ungrouped observation.

use super::attribute::AttributeObservation;
use super::schema::AttributeSchema;

/// One image's dominant attributes: group winners in group declaration
/// order, then ungrouped observations in input order.
pub type DominantSelection = Vec<AttributeObservation>;

/// Select the dominant observation of every group.
///
/// Within a group the highest probability wins; on equal probability the
/// index declared first keeps the win. NaN probabilities never win, so a
/// group with no observed member or only NaN members contributes nothing.
/// Every declared group index is consumed whether or not it won, so only
/// ungrouped observations are passed through.
pub fn resolve_dominant(observations: &[AttributeObservation], schema: &AttributeSchema) -> DominantSelection {
    let mut by_index: Vec<Option<&AttributeObservation>> = vec![None; schema.len()];
    for obs in observations {
        if let Some(slot @ None) = by_index.get_mut(obs.index) {
            *slot = Some(obs);
        }
    }

    let mut selection = Vec::with_capacity(schema.groups().len());

    for group in schema.groups() {
        let mut best: Option<&AttributeObservation> = None;
        for &index in &group.indices {
            let Some(candidate) = by_index[index] else {
                continue;
            };
            // a NaN score never wins
            if candidate.probability.is_nan() {
                continue;
            }
            match best {
                Some(current) if candidate.probability <= current.probability => {}
                _ => best = Some(candidate),
            }
        }

        if let Some(winner) = best {
            selection.push(with_resolved_label(winner, schema));
        }
    }

    selection.extend(
        observations
            .iter()
            .filter(|obs| !schema.is_grouped(obs.index))
            .map(|obs| with_resolved_label(obs, schema)),
    );

    selection
}

fn with_resolved_label(obs: &AttributeObservation, schema: &AttributeSchema) -> AttributeObservation {
    let mut resolved = obs.clone();
    if let Some(label) = schema.label(obs.index) {
        resolved.display_label = Some(label.to_string());
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::attribute::observations_from_logits;
    use crate::engine::schema::ExclusiveGroup;
    use std::collections::HashMap;

    fn obs(index: usize, probability: f32) -> AttributeObservation {
        AttributeObservation {
            index,
            probability,
            raw_score: 0.0,
            attribute_id: format!("attr_{}", index),
            display_label: None,
        }
    }

    fn schema(n: usize, groups: Vec<ExclusiveGroup>) -> AttributeSchema {
        let ids = (0..n).map(|i| format!("attr_{}", i)).collect();
        AttributeSchema::new(ids, groups, HashMap::new()).unwrap()
    }

    fn indices(selection: &[AttributeObservation]) -> Vec<usize> {
        selection.iter().map(|o| o.index).collect()
    }

    #[test]
    fn test_single_group_scenario() {
        let schema = AttributeSchema::new(
            vec!["Smiling".into(), "Frowning".into()],
            vec![ExclusiveGroup::new("G", vec![0, 1])],
            HashMap::from([(0, "Smile".to_string())]),
        )
        .unwrap();

        let observations = observations_from_logits(&[2.0, -1.0], &schema);
        let selection = resolve_dominant(&observations, &schema);

        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].index, 0);
        assert_eq!(selection[0].display_key(), "Smile");
    }

    #[test]
    fn test_winner_has_max_probability() {
        let schema = schema(4, vec![ExclusiveGroup::new("g", vec![0, 1, 2, 3])]);
        let observations = vec![obs(0, 0.1), obs(1, 0.7), obs(2, 0.9), obs(3, 0.3)];

        let selection = resolve_dominant(&observations, &schema);
        assert_eq!(indices(&selection), vec![2]);
    }

    #[test]
    fn test_tie_keeps_first_declared() {
        // declared order 2, 0, 1
        let schema = schema(3, vec![ExclusiveGroup::new("g", vec![2, 0, 1])]);
        let observations = vec![obs(0, 0.6), obs(1, 0.6), obs(2, 0.6)];

        let selection = resolve_dominant(&observations, &schema);
        assert_eq!(indices(&selection), vec![2]);
    }

    #[test]
    fn test_output_order_groups_then_ungrouped() {
        let schema = schema(
            7,
            vec![
                ExclusiveGroup::new("late", vec![5, 6]),
                ExclusiveGroup::new("early", vec![0, 1]),
            ],
        );
        let observations: Vec<_> = (0..7).map(|i| obs(i, 0.1 * i as f32)).collect();

        let selection = resolve_dominant(&observations, &schema);
        assert_eq!(indices(&selection), vec![6, 1, 2, 3, 4]);
    }

    #[test]
    fn test_every_ungrouped_index_appears_once() {
        let schema = schema(6, vec![ExclusiveGroup::new("g", vec![1, 3])]);
        let observations: Vec<_> = (0..6).map(|i| obs(i, 0.2)).collect();

        let selection = resolve_dominant(&observations, &schema);
        for ungrouped in [0, 2, 4, 5] {
            assert_eq!(selection.iter().filter(|o| o.index == ungrouped).count(), 1);
        }
        assert_eq!(selection.iter().filter(|o| schema.is_grouped(o.index)).count(), 1);
    }

    #[test]
    fn test_truncated_output_skips_missing_group() {
        let schema = schema(
            5,
            vec![
                ExclusiveGroup::new("present", vec![0, 1]),
                ExclusiveGroup::new("partial", vec![2, 4]),
                ExclusiveGroup::new("missing", vec![3]),
            ],
        );
        // model only produced three logits
        let observations = vec![obs(0, 0.2), obs(1, 0.1), obs(2, 0.05)];

        let selection = resolve_dominant(&observations, &schema);
        assert_eq!(indices(&selection), vec![0, 2]);
    }

    #[test]
    fn test_nan_probability_never_wins() {
        let schema = schema(3, vec![ExclusiveGroup::new("g", vec![0, 1, 2])]);

        let selection = resolve_dominant(&[obs(0, 0.4), obs(1, f32::NAN), obs(2, 0.3)], &schema);
        assert_eq!(indices(&selection), vec![0]);

        let selection = resolve_dominant(&[obs(0, f32::NAN), obs(1, 0.2)], &schema);
        assert_eq!(indices(&selection), vec![1]);

        let selection = resolve_dominant(&[obs(0, f32::NAN)], &schema);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_nan_logit_from_model_is_skipped() {
        let schema = schema(2, vec![ExclusiveGroup::new("g", vec![0, 1])]);
        let observations = observations_from_logits(&[-3.0, f32::NAN], &schema);

        let selection = resolve_dominant(&observations, &schema);
        assert_eq!(indices(&selection), vec![0]);
    }

    #[test]
    fn test_low_confidence_winner_is_still_dominant() {
        let schema = schema(2, vec![ExclusiveGroup::new("g", vec![0, 1])]);
        let selection = resolve_dominant(&[obs(0, 0.2), obs(1, 0.3)], &schema);
        assert_eq!(indices(&selection), vec![1]);
    }
}
