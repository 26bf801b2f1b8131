use serde::Serialize;

/// The smallest number of terms any series inversion will report, which keeps at least one
/// interior node on every transfinite edge.
pub const MIN_TERMS: usize = 3;

const UNIT_RATIO_TOL: f64 = 1e-12;

/// Returns the number of terms of the geometric series `first_term * ratio^i` needed for the
/// cumulative sum to reach `total`, using the closed form
/// `ceil(ln(1 + total / first_term * (ratio - 1)) / ln(ratio))`.
///
/// A unit ratio degenerates to `total / first_term`. Inputs for which the series can never reach
/// the total (non-positive sizes, or a shrinking ratio whose limit is below `total`) return
/// `MIN_TERMS`, as does any result smaller than it.
pub fn series_term_count(total: f64, first_term: f64, ratio: f64) -> usize {
    if !(total > 0.0) || !(first_term > 0.0) || !(ratio > 0.0) {
        return MIN_TERMS;
    }

    let n = if (ratio - 1.0).abs() < UNIT_RATIO_TOL {
        (total / first_term).ceil()
    } else {
        let arg = 1.0 + total / first_term * (ratio - 1.0);
        if arg <= 0.0 {
            return MIN_TERMS;
        }
        (arg.ln() / ratio.ln()).ceil()
    };

    if n.is_finite() {
        n.max(MIN_TERMS as f64) as usize
    } else {
        MIN_TERMS
    }
}

/// The result of fitting a geometric series between a first and a last term over a known length
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SeriesFit {
    pub ratio: f64,
    pub count: usize,
}

impl SeriesFit {
    pub fn degenerate() -> SeriesFit {
        SeriesFit {
            ratio: 1.0,
            count: MIN_TERMS,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        *self == SeriesFit::degenerate()
    }
}

/// Solves for the ratio of a geometric series of total `length` which starts with `first_term`
/// and ends with `last_term`, from the identity `length = (last * r - first) / (r - 1)`, which
/// gives `r = (length - first) / (length - last)`. The term count then follows from
/// `series_term_count`.
///
/// When the relation is ill-posed (`length <= last_term`, or non-positive terms) the fit is the
/// unit ratio with `MIN_TERMS` terms.
pub fn series_ratio_from_endpoints(length: f64, first_term: f64, last_term: f64) -> SeriesFit {
    if !(first_term > 0.0) || !(last_term > 0.0) || !(length > last_term) || !(length > first_term) {
        return SeriesFit::degenerate();
    }

    let ratio = (length - first_term) / (length - last_term);
    SeriesFit {
        ratio,
        count: series_term_count(length, first_term, ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use test_case::test_case;

    fn naive(total: f64, first: f64, ratio: f64) -> usize {
        let mut sum = 0.0;
        let mut term = first;
        let mut n = 0;
        while sum < total {
            sum += term;
            term *= ratio;
            n += 1;
        }
        n.max(MIN_TERMS)
    }

    #[test]
    fn wall_normal_layer_count() {
        let n = series_term_count(5.0, 3e-5, 1.2);
        assert_eq!(58, n);
        assert_eq!(naive(5.0, 3e-5, 1.2), n);
    }

    #[test_case(1.0, 0.1, 1.0, 10)]
    #[test_case(1.0, 0.3, 1.0, 4)]
    #[test_case(0.1, 1.0, 1.2, 3)]
    #[test_case(0.0, 1.0, 1.2, 3)]
    #[test_case(1.0, 0.0, 1.2, 3)]
    #[test_case(10.0, 1.0, 0.5, 3)]
    fn term_count_edge_cases(total: f64, first: f64, ratio: f64, e: usize) {
        assert_eq!(e, series_term_count(total, first, ratio));
    }

    #[test_case(10.0, 0.01, 1.025)]
    #[test_case(5.0, 1e-3, 1.1)]
    #[test_case(2.0, 0.05, 0.98)]
    fn term_count_matches_summation(total: f64, first: f64, ratio: f64) {
        assert_eq!(naive(total, first, ratio), series_term_count(total, first, ratio));
    }

    #[test]
    fn term_count_is_monotonic_in_total() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let first: f64 = rng.gen_range(1e-6..1e-1);
            let ratio: f64 = rng.gen_range(1.001..1.5);
            let mut totals: Vec<f64> = (0..50).map(|_| rng.gen_range(0.0..20.0)).collect();
            totals.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let counts: Vec<usize> = totals
                .iter()
                .map(|t| series_term_count(*t, first, ratio))
                .collect();
            assert!(counts.iter().all(|c| *c >= MIN_TERMS));
            assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn ratio_from_endpoints() {
        let fit = series_ratio_from_endpoints(1.0, 0.00375, 0.01);
        assert_relative_eq!((1.0 - 0.00375) / (1.0 - 0.01), fit.ratio, epsilon = 1e-12);

        // The last term of the fitted series should come back out near the requested size
        let last = 0.00375 * fit.ratio.powi(fit.count as i32 - 1);
        assert_relative_eq!(0.01, last, epsilon = 2e-4);
    }

    #[test_case(0.01, 0.001, 0.01)]
    #[test_case(0.005, 0.001, 0.01)]
    #[test_case(0.0, 0.001, 0.01)]
    #[test_case(1.0, 0.0, 0.01)]
    fn ratio_from_endpoints_degenerate(length: f64, first: f64, last: f64) {
        let fit = series_ratio_from_endpoints(length, first, last);
        assert!(fit.is_degenerate());
        assert_eq!(MIN_TERMS, fit.count);
    }
}
