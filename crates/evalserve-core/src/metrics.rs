//! Aggregate metrics over recorded events

use rand::Rng;
use rand::seq::index;
use serde_json::Value;

use crate::recorder::RecordedEvent;

/// Number of resampling rounds for [`bootstrap_std`]
pub const BOOTSTRAP_ROUNDS: usize = 1000;

/// Fraction of match events marked correct
///
/// NaN when there are no events.
pub fn accuracy(events: &[RecordedEvent]) -> f64 {
    mean(&correctness(events))
}

/// Bootstrap estimate of the standard deviation of accuracy
///
/// Each round draws half the events without replacement and takes the mean.
/// NaN when fewer than two events exist.
pub fn bootstrap_std<R: Rng + ?Sized>(events: &[RecordedEvent], rng: &mut R) -> f64 {
    let values = correctness(events);
    let half = values.len() / 2;
    if half == 0 {
        return f64::NAN;
    }

    let means: Vec<f64> = (0..BOOTSTRAP_ROUNDS)
        .map(|_| {
            let picked = index::sample(rng, values.len(), half);
            picked.iter().map(|i| values[i]).sum::<f64>() / half as f64
        })
        .collect();

    population_std(&means)
}

/// Mean of the numeric `data[key]` across events
///
/// Events without a numeric value under `key` are skipped.
pub fn mean_of(events: &[RecordedEvent], key: &str) -> f64 {
    let values: Vec<f64> = events
        .iter()
        .filter_map(|event| event.data.get(key).and_then(numeric))
        .collect();
    mean(&values)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with the population (n) denominator
pub fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.is_nan() {
        return f64::NAN;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn correctness(events: &[RecordedEvent]) -> Vec<f64> {
    events
        .iter()
        .map(|event| match event.data.get("correct") {
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        })
        .collect()
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{EventKind, Recorder};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn match_events(outcomes: &[bool]) -> Vec<RecordedEvent> {
        let recorder = Recorder::detached("test-run");
        for (i, correct) in outcomes.iter().enumerate() {
            recorder.record_event(
                EventKind::Match,
                Some(&format!("s.{i}")),
                json!({"correct": correct}),
            );
        }
        recorder.events_of(EventKind::Match)
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&match_events(&[true, false, true, true])), 0.75);
        assert_eq!(accuracy(&match_events(&[false])), 0.0);
        assert!(accuracy(&[]).is_nan());
    }

    #[test]
    fn test_bootstrap_std_needs_two_events() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(bootstrap_std(&match_events(&[true]), &mut rng).is_nan());
        assert!(bootstrap_std(&[], &mut rng).is_nan());
    }

    #[test]
    fn test_bootstrap_std_constant_outcomes() {
        let mut rng = StdRng::seed_from_u64(7);
        let std = bootstrap_std(&match_events(&[true, true, true, true]), &mut rng);
        assert_eq!(std, 0.0);
    }

    #[test]
    fn test_bootstrap_std_mixed_outcomes() {
        let mut rng = StdRng::seed_from_u64(7);
        let std = bootstrap_std(&match_events(&[true, false, true, false]), &mut rng);
        assert!(std > 0.0 && std <= 0.5);
    }

    #[test]
    fn test_mean_of_skips_missing() {
        let recorder = Recorder::detached("test-run");
        recorder.record_event(EventKind::Metrics, None, json!({"f1_score": 0.5}));
        recorder.record_event(EventKind::Metrics, None, json!({"f1_score": 1.0}));
        recorder.record_event(EventKind::Metrics, None, json!({"other": 3}));

        let events = recorder.events_of(EventKind::Metrics);
        assert_eq!(mean_of(&events, "f1_score"), 0.75);
        assert!(mean_of(&events, "missing").is_nan());
    }

    #[test]
    fn test_population_std() {
        assert_eq!(population_std(&[1.0, 1.0]), 0.0);
        assert_eq!(population_std(&[0.0, 2.0]), 1.0);
        assert!(population_std(&[]).is_nan());
    }
}
