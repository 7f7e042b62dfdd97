//! One-dimensional parabolic erosion and dilation.
//!
//! For a line `f` and curvature `c` the erosion is
//!
//! ```text
//! e[i] = min_j ( f[j] + c·(i − j)² )
//! ```
//!
//! and the dilation is `d[i] = max_j ( f[j] − c·(i − j)² )`, the lower and
//! upper envelopes of the parabolas rooted at every sample. Dilation is computed
//! as the negated erosion of the negated line; negation is exact, so the two are
//! dual bit for bit.
//!
//! Two exact algorithms are provided:
//!
//! * the intersection algorithm (van den Boomgaard; Felzenszwalb & Huttenlocher),
//!   O(N) regardless of the curvature and the sample values;
//! * the contact point algorithm, two half-parabola sweeps whose search window
//!   starts at the previous contact point. Cheaper for narrow parabolas, but the
//!   window grows with `sqrt(range / c)`, so a line with a large dynamic range
//!   costs up to O(N²).
//!
//! Infinite samples are valid: `+inf` never wins an erosion and `-inf` wins
//! everywhere, as in the definition above.

use serde::{Deserialize, Serialize};

/// Curvatures at or below this value are treated as degenerate and leave the line unchanged.
pub const MIN_CURVATURE: f64 = 1e-12;

/// [`ParabolicAlgorithm::Auto`] tries the contact point algorithm above this curvature.
pub const CONTACT_POINT_CURVATURE: f64 = 5.0;

/// Widest contact point search window [`ParabolicAlgorithm::Auto`] accepts before it
/// switches the line to the intersection algorithm.
pub const CONTACT_POINT_MAX_WINDOW: usize = 32;

/// Direction of a parabolic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MorphMode {
    /// Lower envelope: minimum of `f[j] + c·(i − j)²`.
    Erode,
    /// Upper envelope: maximum of `f[j] − c·(i − j)²`.
    Dilate,
}

/// Line algorithm used by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParabolicAlgorithm {
    /// Envelope construction by parabola intersection. O(N) per line whatever the
    /// scale or the sample values.
    #[default]
    Intersection,
    /// Contact point sweeps. Sometimes faster at small scales, quadratic in the worst case.
    ContactPoint,
    /// Contact point above [`CONTACT_POINT_CURVATURE`], falling back to the intersection
    /// algorithm as soon as the search window passes [`CONTACT_POINT_MAX_WINDOW`]. Stays
    /// O(N) per line.
    Auto,
}

/// Reusable buffers for the line algorithms.
///
/// One scratch per worker avoids an allocation per line.
#[derive(Debug, Default, Clone)]
pub struct LineScratch {
    /// roots of the parabolas on the envelope
    roots: Vec<usize>,
    /// abscissae where consecutive envelope parabolas meet
    bounds: Vec<f64>,
    /// copy of the input line or the intermediate half-parabola sweep
    line: Vec<f64>,
}

impl LineScratch {
    /// Create an empty scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scratch sized for lines of `len` samples.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            roots: Vec::with_capacity(len),
            bounds: Vec::with_capacity(len + 1),
            line: Vec::with_capacity(len),
        }
    }
}

/// Whether a curvature leaves every line unchanged.
///
/// Infinite (zero scale) and non-positive or vanishing curvatures are pass-through.
#[inline]
pub fn is_pass_through(curvature: f64) -> bool {
    !curvature.is_finite() || curvature <= MIN_CURVATURE
}

/// Erode or dilate a line in place with the default (intersection) algorithm.
///
/// # Examples
///
/// ```
/// use paramorph_imgproc::kernel::{parabolic_line, MorphMode};
///
/// let mut line = vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
/// parabolic_line(&mut line, 1.0, MorphMode::Dilate);
/// assert_eq!(line, vec![0.0, 1.0, 4.0, 5.0, 4.0, 1.0, 0.0]);
/// ```
pub fn parabolic_line(line: &mut [f64], curvature: f64, mode: MorphMode) {
    let mut scratch = LineScratch::with_capacity(line.len());
    parabolic_line_with(
        line,
        curvature,
        mode,
        ParabolicAlgorithm::default(),
        &mut scratch,
    );
}

/// Erode or dilate a line in place.
///
/// # Arguments
///
/// * `line` - The samples, overwritten with the result.
/// * `curvature` - The parabola coefficient `c`.
/// * `mode` - Erosion or dilation.
/// * `algorithm` - The line algorithm.
/// * `scratch` - Reusable buffers.
pub fn parabolic_line_with(
    line: &mut [f64],
    curvature: f64,
    mode: MorphMode,
    algorithm: ParabolicAlgorithm,
    scratch: &mut LineScratch,
) {
    if line.len() < 2 || is_pass_through(curvature) {
        return;
    }

    if mode == MorphMode::Dilate {
        line.iter_mut().for_each(|v| *v = -*v);
    }

    match algorithm {
        ParabolicAlgorithm::Intersection => erode_intersection(line, curvature, scratch),
        ParabolicAlgorithm::ContactPoint => {
            erode_contact_point(line, curvature, scratch, usize::MAX);
        }
        ParabolicAlgorithm::Auto => {
            if curvature <= CONTACT_POINT_CURVATURE
                || !erode_contact_point(line, curvature, scratch, CONTACT_POINT_MAX_WINDOW)
            {
                erode_intersection(line, curvature, scratch);
            }
        }
    }

    if mode == MorphMode::Dilate {
        line.iter_mut().for_each(|v| *v = -*v);
    }
}

/// The O(N²) definition, for reference and testing.
pub fn parabolic_line_brute_force(input: &[f64], curvature: f64, mode: MorphMode) -> Vec<f64> {
    if input.len() < 2 || is_pass_through(curvature) {
        return input.to_vec();
    }
    (0..input.len())
        .map(|i| {
            let candidates = input.iter().enumerate().map(|(j, &f)| {
                let d = i as f64 - j as f64;
                match mode {
                    MorphMode::Erode => f + curvature * (d * d),
                    MorphMode::Dilate => f - curvature * (d * d),
                }
            });
            match mode {
                MorphMode::Erode => candidates.fold(f64::INFINITY, f64::min),
                MorphMode::Dilate => candidates.fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}

// abscissa where the parabolas rooted at p < q meet; written without forming
// g/c + q² so large indices do not swamp small sample differences
#[inline]
fn intersection(g: &[f64], curvature: f64, p: usize, q: usize) -> f64 {
    let (pf, qf) = (p as f64, q as f64);
    (g[q] - g[p]) / (2.0 * curvature * (qf - pf)) + 0.5 * (qf + pf)
}

fn erode_intersection(line: &mut [f64], curvature: f64, scratch: &mut LineScratch) {
    // -inf + c·d² is -inf at every position
    if line.contains(&f64::NEG_INFINITY) {
        line.fill(f64::NEG_INFINITY);
        return;
    }

    let n = line.len();
    let LineScratch {
        roots,
        bounds,
        line: g,
    } = scratch;

    g.clear();
    g.extend_from_slice(line);
    let g: &[f64] = g;
    roots.clear();
    roots.resize(n, 0);
    bounds.clear();
    bounds.resize(n + 1, f64::INFINITY);

    // +inf (and NaN) samples are never below the envelope, so they root no parabola
    let mut finite = (0..n).filter(|&q| g[q].is_finite());
    let Some(first) = finite.next() else {
        line.fill(f64::INFINITY);
        return;
    };

    let mut k = 0;
    roots[0] = first;
    bounds[0] = f64::NEG_INFINITY;
    for q in finite {
        let mut s = intersection(g, curvature, roots[k], q);
        while k > 0 && s <= bounds[k] {
            k -= 1;
            s = intersection(g, curvature, roots[k], q);
        }
        k += 1;
        roots[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (x, out) in line.iter_mut().enumerate() {
        let xf = x as f64;
        while bounds[k + 1] < xf {
            k += 1;
        }
        let p = roots[k];
        let d = xf - p as f64;
        *out = g[p] + curvature * (d * d);
    }
}

// Returns false, leaving `line` untouched, when a search window grows past
// `max_window` samples.
fn erode_contact_point(
    line: &mut [f64],
    curvature: f64,
    scratch: &mut LineScratch,
    max_window: usize,
) -> bool {
    let n = line.len();
    let LineScratch {
        bounds: out,
        line: half,
        ..
    } = scratch;
    half.clear();
    half.resize(n, 0.0);
    out.clear();
    out.resize(n, 0.0);

    // left half-parabola: roots at or before pos; the largest minimiser
    // never moves backwards
    let mut start = 0;
    for pos in 0..n {
        if pos - start >= max_window {
            return false;
        }
        let mut best = f64::INFINITY;
        let mut contact = pos;
        for (j, &f) in line.iter().enumerate().take(pos + 1).skip(start) {
            let d = (pos - j) as f64;
            let t = f + curvature * (d * d);
            if t <= best {
                best = t;
                contact = j;
            }
        }
        half[pos] = best;
        start = contact;
    }

    // right half-parabola over the left sweep; the smallest minimiser
    // never moves forwards
    let mut end = n - 1;
    for pos in (0..n).rev() {
        if end - pos >= max_window {
            return false;
        }
        let mut best = f64::INFINITY;
        let mut contact = pos;
        for j in (pos..=end).rev() {
            let d = (j - pos) as f64;
            let t = half[j] + curvature * (d * d);
            if t <= best {
                best = t;
                contact = j;
            }
        }
        out[pos] = best;
        end = contact;
    }

    line.copy_from_slice(out);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const ALGORITHMS: [ParabolicAlgorithm; 3] = [
        ParabolicAlgorithm::Intersection,
        ParabolicAlgorithm::ContactPoint,
        ParabolicAlgorithm::Auto,
    ];

    fn run(input: &[f64], c: f64, mode: MorphMode, algorithm: ParabolicAlgorithm) -> Vec<f64> {
        let mut line = input.to_vec();
        parabolic_line_with(&mut line, c, mode, algorithm, &mut LineScratch::new());
        line
    }

    #[test]
    fn test_empty_and_single() {
        for algorithm in ALGORITHMS {
            assert!(run(&[], 1.0, MorphMode::Erode, algorithm).is_empty());
            assert_eq!(run(&[3.5], 1.0, MorphMode::Erode, algorithm), vec![3.5]);
            assert_eq!(run(&[3.5], 1.0, MorphMode::Dilate, algorithm), vec![3.5]);
        }
    }

    #[test]
    fn test_erode_spike() {
        let input = [0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        let reference = parabolic_line_brute_force(&input, 1.0, MorphMode::Erode);
        assert_eq!(reference, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        for algorithm in ALGORITHMS {
            let out = run(&input, 1.0, MorphMode::Erode, algorithm);
            for (a, b) in out.iter().zip(&reference) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_dilate_spike() {
        let input = [0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        for algorithm in ALGORITHMS {
            let out = run(&input, 1.0, MorphMode::Dilate, algorithm);
            assert_eq!(out, vec![0.0, 1.0, 4.0, 5.0, 4.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_matches_brute_force_random() {
        let mut rng = StdRng::seed_from_u64(7);
        for &c in &[1e-3, 0.05, 0.5, 1.0, 4.0, 25.0, 1e4] {
            for len in [2, 3, 17, 64, 257] {
                let input: Vec<f64> = (0..len).map(|_| rng.random_range(-100.0..100.0)).collect();
                for mode in [MorphMode::Erode, MorphMode::Dilate] {
                    let reference = parabolic_line_brute_force(&input, c, mode);
                    for algorithm in ALGORITHMS {
                        let out = run(&input, c, mode, algorithm);
                        for (a, b) in out.iter().zip(&reference) {
                            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_plateaus_and_ties() {
        let input = [2.0, 2.0, 1.0, 1.0, 1.0, 3.0, 3.0, 0.0, 0.0, 2.0];
        for &c in &[0.25, 1.0] {
            for mode in [MorphMode::Erode, MorphMode::Dilate] {
                let reference = parabolic_line_brute_force(&input, c, mode);
                for algorithm in ALGORITHMS {
                    let out = run(&input, c, mode, algorithm);
                    for (a, b) in out.iter().zip(&reference) {
                        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_pass_through() {
        let input = [4.0, -1.0, 7.0, 2.0];
        for c in [f64::INFINITY, 0.0, 1e-15, -1.0, f64::NAN] {
            for algorithm in ALGORITHMS {
                assert_eq!(run(&input, c, MorphMode::Erode, algorithm), input.to_vec());
                assert_eq!(run(&input, c, MorphMode::Dilate, algorithm), input.to_vec());
            }
        }
    }

    #[test]
    fn test_narrow_parabola_is_identity() {
        let input = [4.0, -1.0, 7.0, 2.0, 99.0, -50.0];
        for algorithm in ALGORITHMS {
            assert_eq!(run(&input, 1e6, MorphMode::Erode, algorithm), input.to_vec());
            assert_eq!(run(&input, 1e6, MorphMode::Dilate, algorithm), input.to_vec());
        }
    }

    #[test]
    fn test_duality_is_exact() {
        let mut rng = StdRng::seed_from_u64(11);
        let input: Vec<f64> = (0..100).map(|_| rng.random_range(-10.0..10.0)).collect();
        let negated: Vec<f64> = input.iter().map(|v| -v).collect();
        for algorithm in ALGORITHMS {
            let dilated = run(&input, 0.3, MorphMode::Dilate, algorithm);
            let eroded: Vec<f64> = run(&negated, 0.3, MorphMode::Erode, algorithm)
                .into_iter()
                .map(|v| -v)
                .collect();
            assert_eq!(dilated, eroded);
        }
    }

    #[test]
    fn test_scratch_reuse_across_lengths() {
        let mut scratch = LineScratch::new();
        let mut long = vec![3.0, 0.0, 3.0, 3.0, 3.0, 3.0];
        parabolic_line_with(
            &mut long,
            1.0,
            MorphMode::Erode,
            ParabolicAlgorithm::Intersection,
            &mut scratch,
        );
        assert_eq!(long, vec![1.0, 0.0, 1.0, 3.0, 3.0, 3.0]);

        let mut short = vec![0.0, 8.0];
        parabolic_line_with(
            &mut short,
            1.0,
            MorphMode::Erode,
            ParabolicAlgorithm::Intersection,
            &mut scratch,
        );
        assert_eq!(short, vec![0.0, 1.0]);
    }

    #[test]
    fn test_infinite_samples() {
        let inf = f64::INFINITY;
        let cases: [&[f64]; 6] = [
            &[inf, inf, 0.0],
            &[0.0, inf, inf, inf, 2.0],
            &[inf, inf, inf],
            &[3.0, -inf, 3.0, 1.0],
            &[inf, -inf, 5.0],
            &[inf, 1.0, inf, inf, -2.0, inf],
        ];
        for input in cases {
            for &c in &[0.5, 1.0, 10.0] {
                for mode in [MorphMode::Erode, MorphMode::Dilate] {
                    let line: Vec<f64> = match mode {
                        MorphMode::Erode => input.to_vec(),
                        MorphMode::Dilate => input.iter().map(|v| -v).collect(),
                    };
                    let reference = parabolic_line_brute_force(&line, c, mode);
                    for algorithm in ALGORITHMS {
                        let out = run(&line, c, mode, algorithm);
                        assert_eq!(out, reference, "{algorithm:?} {line:?}");
                    }
                }
            }
        }
        assert_eq!(
            run(&[inf, inf, 0.0], 1.0, MorphMode::Erode, ParabolicAlgorithm::Intersection),
            vec![4.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_auto_stays_linear_on_wide_range() {
        // the erosion of a deep well reaches 316 000 samples at c = 10, so
        // contact point would scan the whole prefix for every output
        let mut input = vec![0.0; 40_000];
        input[0] = -1e12;
        let auto = run(&input, 10.0, MorphMode::Erode, ParabolicAlgorithm::Auto);
        let intersection = run(&input, 10.0, MorphMode::Erode, ParabolicAlgorithm::Intersection);
        assert_eq!(auto, intersection);
        assert_eq!(auto[1], -1e12 + 10.0);
    }

    #[test]
    fn test_auto_fallback_leaves_no_partial_output() {
        let mut scratch = LineScratch::new();
        let mut line = vec![-1e6, 0.0, 0.0, 0.0];
        assert!(!erode_contact_point(&mut line, 10.0, &mut scratch, 2));
        assert_eq!(line, vec![-1e6, 0.0, 0.0, 0.0]);
        assert!(erode_contact_point(&mut line, 10.0, &mut scratch, usize::MAX));
        let reference = parabolic_line_brute_force(&[-1e6, 0.0, 0.0, 0.0], 10.0, MorphMode::Erode);
        assert_eq!(line, reference);
    }

    #[test]
    fn test_default_algorithm() {
        assert_eq!(ParabolicAlgorithm::default(), ParabolicAlgorithm::Intersection);
    }
}
