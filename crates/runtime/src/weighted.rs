use rand::Rng;

/// Samples one value from parallel `values`/`weights`.
///
/// Weights need not be normalised; non-positive weights are never chosen.
/// Returns `None` when the slices are empty, differ in length or carry no
/// positive weight.
pub fn weighted_pick<'a, T, R>(values: &'a [T], weights: &[f64], rng: &mut R) -> Option<&'a T>
where
    R: Rng,
{
    if values.len() != weights.len() {
        return None;
    }
    weighted_index(weights, rng).and_then(|i| values.get(i))
}

/// Index form of [`weighted_pick`], by linear scan over cumulative weight.
pub fn weighted_index<R>(weights: &[f64], rng: &mut R) -> Option<usize>
where
    R: Rng,
{
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let target = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.iter().enumerate() {
        if !(w.is_finite() && *w > 0.0) {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if target < cumulative {
            return Some(i);
        }
    }
    // float rounding can leave `target` a hair above the final bound
    last_positive
}

pub fn pick_uniform<'a, T, R>(values: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng,
{
    if values.is_empty() {
        return None;
    }
    values.get(rng.random_range(0..values.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_weighted_pick_respects_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = ["a", "b", "c"];
        let weights = [0.3, 0.0, 0.5];
        let mut counts = [0usize; 3];

        for _ in 0..80_000 {
            let picked = weighted_pick(&values, &weights, &mut rng).copied();
            match picked {
                Some("a") => counts[0] += 1,
                Some("b") => counts[1] += 1,
                Some("c") => counts[2] += 1,
                _ => panic!("unexpected pick {:?}", picked),
            }
        }

        assert_eq!(counts[1], 0);
        let ratio = counts[0] as f64 / counts[2] as f64;
        assert!((ratio - 0.6).abs() < 0.03, "ratio was {}", ratio);
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(weighted_index(&[], &mut rng), None);
        assert_eq!(weighted_index(&[0.0, -1.0, f64::NAN], &mut rng), None);
        assert_eq!(weighted_pick(&[1, 2], &[1.0], &mut rng), None);
        assert_eq!(pick_uniform::<u8, _>(&[], &mut rng), None);
        assert_eq!(weighted_index(&[0.0, 2.0], &mut rng), Some(1));
    }
}
