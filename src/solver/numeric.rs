use crate::engine::EngineOptions;

const BISECTION_STEPS: usize = 200;
const GOLDEN_STEPS: usize = 120;
const DUPLICATE_GAP: f64 = 1e-7;

/// Scan `[scan_min, scan_max]` for real roots of `f`. Sign changes are refined by
/// bisection and rejected when they turn out to be poles; touching roots are found by
/// minimizing `|f|` around local dips.
pub(crate) fn scan_roots(f: impl Fn(f64) -> Option<f64>, options: &EngineOptions) -> Vec<f64> {
    let samples = options.scan_samples.max(2);
    let step = (options.scan_max - options.scan_min) / samples as f64;
    let xs: Vec<f64> = (0..=samples)
        .map(|i| options.scan_min + step * i as f64)
        .collect();
    let ys: Vec<Option<f64>> = xs
        .iter()
        .map(|x| f(*x).filter(|y| y.is_finite()))
        .collect();

    let accept = |x: f64| f(x).is_some_and(|y| y.abs() <= options.zero_tolerance.max(1e-6));
    let mut roots = Vec::new();

    for i in 0..samples {
        let (Some(y0), Some(y1)) = (ys[i], ys[i + 1]) else {
            continue;
        };
        if y0 == 0.0 {
            roots.push(xs[i]);
            continue;
        }
        if y0.signum() != y1.signum() && y1 != 0.0 {
            let root = bisect(&f, xs[i], xs[i + 1], y0);
            if accept(root) {
                roots.push(root);
            }
        }
    }
    if ys[samples] == Some(0.0) {
        roots.push(xs[samples]);
    }

    // Local dips of |f| without a sign change.
    for i in 1..samples {
        let (Some(prev), Some(here), Some(next)) = (ys[i - 1], ys[i], ys[i + 1]) else {
            continue;
        };
        if here.signum() != prev.signum() || here.signum() != next.signum() {
            continue;
        }
        if here.abs() < prev.abs() && here.abs() <= next.abs() {
            let x = golden_min(|x| f(x).map_or(f64::INFINITY, f64::abs), xs[i - 1], xs[i + 1]);
            if accept(x) {
                roots.push(x);
            }
        }
    }

    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() < DUPLICATE_GAP);
    roots
}

fn bisect(f: &impl Fn(f64) -> Option<f64>, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let Some(f_mid) = f(mid) else {
            break;
        };
        if f_mid == 0.0 {
            return mid;
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

fn golden_min(g: impl Fn(f64) -> f64, mut a: f64, mut b: f64) -> f64 {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    for _ in 0..GOLDEN_STEPS {
        if g(c) < g(d) {
            b = d;
        } else {
            a = c;
        }
        c = b - ratio * (b - a);
        d = a + ratio * (b - a);
    }
    0.5 * (a + b)
}

/// Snap values within rounding noise of an integer, and trim the rest to twelve digits.
pub(crate) fn tidy(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() < 1e-9 {
        return nearest + 0.0;
    }
    let scale = 1e12;
    (x * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_roots_of_sine_in_scan_range() {
        let roots = scan_roots(|x| Some(x.sin()), &EngineOptions::default());
        assert_eq!(roots.len(), 7);
        assert!(roots.iter().any(|r| r.abs() < 1e-9));
    }

    #[test]
    fn rejects_poles() {
        let roots = scan_roots(|x| Some(1.0 / (x - 0.123)), &EngineOptions::default());
        assert!(roots.is_empty());
    }

    #[test]
    fn finds_touching_roots() {
        let roots = scan_roots(|x| Some((x - 1.234).powi(2)), &EngineOptions::default());
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 1.234).abs() < 1e-6);
    }
}
