//! Discrete prolate spheroidal (Slepian) sequences.
//!
//! The K most concentrated sequences of length N for a normalized half
//! bandwidth W = NW/N are the top eigenvectors of a symmetric tridiagonal
//! matrix:
//!
//!   diag[i]    = ((N - 1 - 2i) / 2)^2 · cos(2πW)
//!   offdiag[i] = i · (N - i) / 2
//!
//! Eigenvalues are located by bisection on the Sturm sequence count and the
//! eigenvectors recovered by inverse iteration on the shifted matrix. Each
//! sequence is normalized to unit energy; symmetric sequences are flipped to
//! have positive mean, antisymmetric ones to start with a positive lag.

use ndarray::{Array1, Array2};

/// The `k` most band-limited unit-energy tapers of length `n` for
/// time-half-bandwidth product `nw`. Rows are tapers, ordered by decreasing
/// spectral concentration.
pub fn dpss_windows(n: usize, nw: f64, k: usize) -> Array2<f64> {
    assert!(n > 1, "dpss needs at least two samples");
    assert!(k >= 1 && k <= n, "need 1 <= k <= n tapers");
    assert!(nw > 0.0 && nw < n as f64 / 2.0, "need 0 < NW < N/2");

    let w = nw / n as f64;
    let cos2pw = (2.0 * std::f64::consts::PI * w).cos();

    let diag: Vec<f64> = (0..n)
        .map(|i| {
            let x = (n - 1) as f64 / 2.0 - i as f64;
            x * x * cos2pw
        })
        .collect();
    let off: Vec<f64> = (1..n).map(|i| (i * (n - i)) as f64 / 2.0).collect();

    // The k largest eigenvalues, in decreasing order.
    let eigvals = top_eigenvalues(&diag, &off, k);

    let mut tapers = Array2::zeros((k, n));
    for (j, &lambda) in eigvals.iter().enumerate() {
        let v = inverse_iteration(&diag, &off, lambda);
        let mut row = tapers.row_mut(j);
        row.assign(&Array1::from(v));
    }

    // Sign conventions: even-order tapers get positive mean, odd-order
    // tapers a positive first lag.
    for (j, mut row) in tapers.rows_mut().into_iter().enumerate() {
        if j % 2 == 0 {
            if row.sum() < 0.0 {
                row.mapv_inplace(|x| -x);
            }
        } else {
            let lag: f64 = (0..n / 2).map(|i| row[i]).sum();
            if lag < 0.0 {
                row.mapv_inplace(|x| -x);
            }
        }
    }

    tapers
}

/// Count of eigenvalues strictly below `x` (Sturm sequence on the LDLᵀ
/// recurrence).
fn sturm_count(diag: &[f64], off: &[f64], x: f64) -> usize {
    let n = diag.len();
    let mut count = 0;
    let mut q = diag[0] - x;
    if q < 0.0 {
        count += 1;
    }
    for i in 1..n {
        let e2 = off[i - 1] * off[i - 1];
        // Guard against exact zero pivots.
        let denom = if q.abs() < 1e-300 {
            1e-300_f64.copysign(if q < 0.0 { -1.0 } else { 1.0 })
        } else {
            q
        };
        q = (diag[i] - x) - e2 / denom;
        if q < 0.0 {
            count += 1;
        }
    }
    count
}

/// The `k` largest eigenvalues, decreasing, by bisection.
fn top_eigenvalues(diag: &[f64], off: &[f64], k: usize) -> Vec<f64> {
    let n = diag.len();

    // Gershgorin bounds.
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..n {
        let mut r = 0.0;
        if i > 0 {
            r += off[i - 1].abs();
        }
        if i < n - 1 {
            r += off[i].abs();
        }
        lo = lo.min(diag[i] - r);
        hi = hi.max(diag[i] + r);
    }

    let mut out = Vec::with_capacity(k);
    for j in 0..k {
        // Looking for the eigenvalue with exactly n-1-j eigenvalues below it.
        let target = n - 1 - j;
        let (mut a, mut b) = (lo, hi);
        for _ in 0..128 {
            let mid = 0.5 * (a + b);
            if sturm_count(diag, off, mid) > target {
                b = mid;
            } else {
                a = mid;
            }
            if (b - a) <= f64::EPSILON * hi.abs().max(1.0) {
                break;
            }
        }
        out.push(0.5 * (a + b));
    }
    out
}

/// One eigenvector of the tridiagonal matrix for an accurate eigenvalue,
/// via inverse iteration with a partially pivoted LU of `T - λI`.
fn inverse_iteration(diag: &[f64], off: &[f64], lambda: f64) -> Vec<f64> {
    let n = diag.len();
    // Nudge the shift so the factorization stays nonsingular.
    let shift = lambda * (1.0 + 1e-12) + 1e-12;

    // Deterministic start with no special symmetry, so it overlaps both
    // symmetric and antisymmetric eigenvectors.
    let mut state = 0x9e3779b97f4a7c15_u64;
    let mut v: Vec<f64> = (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect();
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    v.iter_mut().for_each(|x| *x /= norm);

    for _ in 0..4 {
        let mut y = solve_shifted(diag, off, shift, &v);
        let norm = y.iter().map(|x| x * x).sum::<f64>().sqrt();
        y.iter_mut().for_each(|x| *x /= norm);
        v = y;
    }
    v
}

/// Solve `(T - shift·I) y = rhs` for tridiagonal `T` with partial pivoting.
///
/// Band storage: main diagonal `d`, first superdiagonal `u1`, second
/// superdiagonal `u2` (fill-in created by row swaps).
fn solve_shifted(diag: &[f64], off: &[f64], shift: f64, rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut d: Vec<f64> = diag.iter().map(|&x| x - shift).collect();
    let mut u1: Vec<f64> = off.to_vec();
    let mut u2 = vec![0.0; n.saturating_sub(2)];
    let mut b: Vec<f64> = rhs.to_vec();

    for i in 0..n - 1 {
        // Entry of row i+1 in the pivot column; untouched by earlier steps.
        let mut sub = off[i];

        if sub.abs() > d[i].abs() {
            // Swap rows i and i+1 over columns i, i+1, i+2.
            let (d_old, u1_old) = (d[i], u1[i]);
            d[i] = sub;
            u1[i] = d[i + 1];
            if i < u2.len() {
                u2[i] = if i + 1 < n - 1 { u1[i + 1] } else { 0.0 };
            }
            sub = d_old;
            d[i + 1] = u1_old;
            if i + 1 < n - 1 {
                u1[i + 1] = 0.0;
            }
            b.swap(i, i + 1);
        }

        let pivot = if d[i].abs() < 1e-300 { 1e-300 } else { d[i] };
        let m = sub / pivot;
        d[i + 1] -= m * u1[i];
        if i + 1 < n - 1 && i < u2.len() {
            u1[i + 1] -= m * u2[i];
        }
        b[i + 1] -= m * b[i];
    }

    let mut y = vec![0.0; n];
    for i in (0..n).rev() {
        let mut acc = b[i];
        if i + 1 < n {
            acc -= u1[i] * y[i + 1];
        }
        if i + 2 < n && i < u2.len() {
            acc -= u2[i] * y[i + 2];
        }
        let pivot = if d[i].abs() < 1e-300 { 1e-300 } else { d[i] };
        y[i] = acc / pivot;
    }
    y
}
