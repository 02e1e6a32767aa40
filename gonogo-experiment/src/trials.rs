use gonogo_core::{StimulusColor, TrialSpec};
use rand::Rng;

/// The fixed practice sequence, used verbatim every session. This is the one
/// place color and target-ness co-vary by construction.
pub fn practice_sequence() -> Vec<TrialSpec> {
    vec![
        TrialSpec {
            color: StimulusColor::Green,
            is_target: true,
        },
        TrialSpec {
            color: StimulusColor::Red,
            is_target: false,
        },
        TrialSpec {
            color: StimulusColor::Green,
            is_target: true,
        },
        TrialSpec {
            color: StimulusColor::Red,
            is_target: false,
        },
    ]
}

/// Generate the main trial list.
///
/// `color` and `is_target` are sampled independently, so a red target or a
/// green non-target can occur. This mirrors the original generator; do not
/// derive one from the other without product-owner sign-off.
pub fn generate_main_trials<R: Rng>(
    rng: &mut R,
    trials: usize,
    target_probability: f64,
) -> Vec<TrialSpec> {
    (0..trials)
        .map(|_| TrialSpec {
            color: if rng.random_bool(target_probability) {
                StimulusColor::Green
            } else {
                StimulusColor::Red
            },
            is_target: rng.random_bool(target_probability),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn practice_sequence_is_fixed_and_alternating() {
        let list = practice_sequence();
        assert_eq!(list.len(), 4);
        for (i, spec) in list.iter().enumerate() {
            let expect_target = i % 2 == 0;
            assert_eq!(spec.is_target, expect_target);
            let expect_color = if expect_target {
                StimulusColor::Green
            } else {
                StimulusColor::Red
            };
            assert_eq!(spec.color, expect_color);
        }
        assert_eq!(list, practice_sequence());
    }

    #[test]
    fn main_list_has_requested_length() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_main_trials(&mut rng, 40, 0.6).len(), 40);
        assert!(generate_main_trials(&mut rng, 0, 0.6).is_empty());
    }

    #[test]
    fn main_list_proportions_track_the_probability() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let list = generate_main_trials(&mut rng, n, 0.6);
        let green = list
            .iter()
            .filter(|t| t.color == StimulusColor::Green)
            .count() as f64
            / n as f64;
        let target = list.iter().filter(|t| t.is_target).count() as f64 / n as f64;
        assert!((green - 0.6).abs() < 0.02, "green fraction {green}");
        assert!((target - 0.6).abs() < 0.02, "target fraction {target}");
    }

    #[test]
    fn color_and_target_are_independent_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let list = generate_main_trials(&mut rng, 20_000, 0.6);
        // Both disagreement cases must show up: red targets and green
        // non-targets exist under independent sampling.
        assert!(
            list.iter()
                .any(|t| t.color == StimulusColor::Red && t.is_target)
        );
        assert!(
            list.iter()
                .any(|t| t.color == StimulusColor::Green && !t.is_target)
        );
    }
}
