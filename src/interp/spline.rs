//! Cubic smoothing spline (Reinsch form) with per-piece root extraction.
//!
//! The spline is parameterised by its values `g` at the knots and its second
//! derivatives `γ` (natural boundary: `γ₀ = γₙ₋₁ = 0`). For a smoothing
//! parameter `λ` the interior second derivatives solve
//!
//! `(R + λ·QᵀQ) γ = Qᵀy`, `g = y − λ·Qγ`
//!
//! where `Q` (n×(n−2)) holds the second-difference weights and `R`
//! ((n−2)×(n−2)) is tridiagonal. The system matrix is pentadiagonal and
//! positive definite, solved with a banded Cholesky factorisation. `λ = 0`
//! gives the natural interpolating spline.
//!
//! With a residual bound `s > 0`, `λ` is found by bisection in log space so
//! that `Σ(y − g)² ≤ s`; if even the least-squares straight line satisfies the
//! bound, that line is returned.

use crate::error::{Result, VcutError};
use crate::fit::least_squares;

const LAMBDA_MIN: f64 = 1e-20;
const LAMBDA_MAX: f64 = 1e20;
const LAMBDA_BISECTIONS: usize = 60;
const ROOT_BISECTIONS: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    g: Vec<f64>,
    gamma: Vec<f64>,
}

/// Second-difference weights of column `k` of `Q`, acting on rows `k..k+3`.
#[inline]
fn q_column(h: &[f64], k: usize) -> [f64; 3] {
    let a = 1.0 / h[k];
    let e = 1.0 / h[k + 1];
    [a, -a - e, e]
}

/// Symmetric band matrix with two off-diagonals, lower half stored:
/// `band[i][d] = A[i][i - d]`.
struct Penta {
    band: Vec<[f64; 3]>,
}

impl Penta {
    fn zeros(m: usize) -> Self {
        Self {
            band: vec![[0.0; 3]; m],
        }
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> f64 {
        // j <= i, i - j <= 2
        self.band[i][i - j]
    }

    /// In-place Cholesky `A = L·Lᵀ`. Returns `None` if `A` is not positive definite.
    fn cholesky(mut self) -> Option<Self> {
        let m = self.band.len();
        for i in 0..m {
            let j0 = i.saturating_sub(2);
            for j in j0..=i {
                let mut sum = self.at(i, j);
                let k0 = i.saturating_sub(2).max(j.saturating_sub(2));
                for k in k0..j {
                    sum -= self.at(i, k) * self.at(j, k);
                }
                if i == j {
                    if !(sum > 0.0) {
                        return None;
                    }
                    self.band[i][0] = sum.sqrt();
                } else {
                    self.band[i][i - j] = sum / self.band[j][0];
                }
            }
        }
        Some(self)
    }

    /// Solve `L·Lᵀ x = b` with a factor produced by [`Penta::cholesky`].
    fn solve(&self, b: &[f64]) -> Vec<f64> {
        let m = self.band.len();
        let mut z = b.to_vec();
        for i in 0..m {
            let mut sum = z[i];
            for k in i.saturating_sub(2)..i {
                sum -= self.at(i, k) * z[k];
            }
            z[i] = sum / self.band[i][0];
        }
        for i in (0..m).rev() {
            let mut sum = z[i];
            for k in (i + 1)..(i + 3).min(m) {
                sum -= self.at(k, i) * z[k];
            }
            z[i] = sum / self.band[i][0];
        }
        z
    }
}

impl CubicSpline {
    /// Natural cubic spline through all samples.
    pub fn interpolating(x: &[f64], y: &[f64]) -> Result<Self> {
        Self::with_lambda(x, y, 0.0)
    }

    /// Smoothing spline whose residual sum of squares does not exceed `s`.
    pub fn smoothing(x: &[f64], y: &[f64], s: f64) -> Result<Self> {
        if !(s >= 0.0) || !s.is_finite() {
            return Err(VcutError::invalid("smoothing", format!("{s} is not a finite value ≥ 0")));
        }
        if s == 0.0 {
            return Self::interpolating(x, y);
        }
        check_knots(x, y)?;
        let line = least_squares(x, y)?;
        let line_rss = line.rms * line.rms * x.len() as f64;
        if line_rss <= s {
            log::debug!("spline: residual bound {s:.3e} admits straight line (rss {line_rss:.3e})");
            return Ok(Self {
                x: x.to_vec(),
                g: x.iter().map(|&xi| line.eval(xi)).collect(),
                gamma: vec![0.0; x.len()],
            });
        }

        let mut hi = 1.0;
        let mut fit_hi = Self::with_lambda(x, y, hi)?;
        while fit_hi.rss(y) < s && hi < LAMBDA_MAX {
            hi *= 10.0;
            fit_hi = Self::with_lambda(x, y, hi)?;
        }
        let mut lo = hi / 10.0;
        let mut fit_lo = Self::with_lambda(x, y, lo)?;
        while fit_lo.rss(y) > s && lo > LAMBDA_MIN {
            lo /= 10.0;
            fit_lo = Self::with_lambda(x, y, lo)?;
        }
        for _ in 0..LAMBDA_BISECTIONS {
            let mid = (lo * hi).sqrt();
            let fit_mid = Self::with_lambda(x, y, mid)?;
            if fit_mid.rss(y) <= s {
                lo = mid;
                fit_lo = fit_mid;
            } else {
                hi = mid;
            }
        }
        log::debug!("spline: λ={lo:.3e} rss={:.3e} (bound {s:.3e})", fit_lo.rss(y));
        Ok(fit_lo)
    }

    fn with_lambda(x: &[f64], y: &[f64], lambda: f64) -> Result<Self> {
        check_knots(x, y)?;
        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let m = n - 2;

        let mut a = Penta::zeros(m);
        let mut rhs = vec![0.0; m];
        for k in 0..m {
            a.band[k][0] = (h[k] + h[k + 1]) / 3.0;
            if k + 1 < m {
                a.band[k + 1][1] = h[k + 1] / 6.0;
            }
            let q = q_column(&h, k);
            rhs[k] = q[0] * y[k] + q[1] * y[k + 1] + q[2] * y[k + 2];
        }
        if lambda > 0.0 {
            for k in 0..m {
                let qk = q_column(&h, k);
                a.band[k][0] += lambda * (qk[0] * qk[0] + qk[1] * qk[1] + qk[2] * qk[2]);
                if k + 1 < m {
                    let q1 = q_column(&h, k + 1);
                    a.band[k + 1][1] += lambda * (qk[1] * q1[0] + qk[2] * q1[1]);
                }
                if k + 2 < m {
                    let q2 = q_column(&h, k + 2);
                    a.band[k + 2][2] += lambda * qk[2] * q2[0];
                }
            }
        }

        let factor = a
            .cholesky()
            .ok_or_else(|| VcutError::degenerate_fit("spline system is not positive definite"))?;
        let interior = factor.solve(&rhs);

        let mut gamma = vec![0.0; n];
        gamma[1..n - 1].copy_from_slice(&interior);
        let mut g = y.to_vec();
        if lambda > 0.0 {
            for (k, &gk) in interior.iter().enumerate() {
                let q = q_column(&h, k);
                for (d, qd) in q.iter().enumerate() {
                    g[k + d] -= lambda * qd * gk;
                }
            }
        }
        Ok(Self {
            x: x.to_vec(),
            g,
            gamma,
        })
    }

    fn rss(&self, y: &[f64]) -> f64 {
        self.g.iter().zip(y).map(|(g, y)| (y - g) * (y - g)).sum()
    }

    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    /// Spline values at the knots.
    pub fn values(&self) -> &[f64] {
        &self.g
    }

    /// Power-basis coefficients `[a, b, c, d]` of piece `i` in `t = x − xᵢ`.
    fn piece(&self, i: usize) -> [f64; 4] {
        let h = self.x[i + 1] - self.x[i];
        let (g0, g1) = (self.g[i], self.g[i + 1]);
        let (c0, c1) = (self.gamma[i], self.gamma[i + 1]);
        [
            g0,
            (g1 - g0) / h - h * (2.0 * c0 + c1) / 6.0,
            c0 / 2.0,
            (c1 - c0) / (6.0 * h),
        ]
    }

    /// Evaluate the spline; outside the knot range the end pieces are extended.
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.x.len() - 2;
        let i = match self.x.partition_point(|&k| k <= x) {
            0 => 0,
            p => (p - 1).min(last),
        };
        let [a, b, c, d] = self.piece(i);
        let t = x - self.x[i];
        a + t * (b + t * (c + t * d))
    }

    /// All real roots within the knot range, ascending.
    pub fn roots(&self) -> Vec<f64> {
        let n = self.x.len();
        let mut roots = Vec::new();
        for i in 0..n - 1 {
            let h = self.x[i + 1] - self.x[i];
            let coeffs = self.piece(i);
            let mut cuts = vec![0.0];
            cuts.extend(critical_points(&coeffs).into_iter().filter(|&t| t > 0.0 && t < h));
            cuts.push(h);
            let value = |t: f64, k: usize| {
                if k == 0 {
                    self.g[i]
                } else if k == cuts.len() - 1 {
                    self.g[i + 1]
                } else {
                    cubic(&coeffs, t)
                }
            };
            for k in 0..cuts.len() - 1 {
                let (t0, t1) = (cuts[k], cuts[k + 1]);
                let (f0, f1) = (value(t0, k), value(t1, k + 1));
                if f0 == 0.0 {
                    roots.push(self.x[i] + t0);
                } else if f0 * f1 < 0.0 {
                    roots.push(self.x[i] + bisect(&coeffs, t0, t1, f0));
                }
            }
        }
        if self.g[n - 1] == 0.0 {
            roots.push(self.x[n - 1]);
        }
        roots.sort_by(f64::total_cmp);
        let span = (self.x[n - 1] - self.x[0]).abs().max(1.0);
        roots.dedup_by(|b, a| (*b - *a).abs() <= 1e-12 * span);
        roots
    }
}

fn check_knots(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(VcutError::invalid(
            "y",
            format!("length {} does not match x length {}", y.len(), x.len()),
        ));
    }
    if x.len() < 3 {
        return Err(VcutError::invalid("x", format!("{} knots, need at least 3", x.len())));
    }
    if x.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(VcutError::invalid("x", "knots must be strictly increasing"));
    }
    Ok(())
}

#[inline]
fn cubic(c: &[f64; 4], t: f64) -> f64 {
    c[0] + t * (c[1] + t * (c[2] + t * c[3]))
}

/// Zeros of the derivative `b + 2c·t + 3d·t²`.
fn critical_points(c: &[f64; 4]) -> Vec<f64> {
    let (qa, qb, qc) = (3.0 * c[3], 2.0 * c[2], c[1]);
    if qa.abs() <= f64::EPSILON * (qb.abs() + qc.abs()) {
        if qb == 0.0 {
            return Vec::new();
        }
        return vec![-qc / qb];
    }
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    let mut ts = vec![(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)];
    ts.sort_by(f64::total_cmp);
    ts
}

fn bisect(c: &[f64; 4], mut lo: f64, mut hi: f64, f_lo: f64) -> f64 {
    let lo_negative = f_lo < 0.0;
    for _ in 0..ROOT_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let fm = cubic(c, mid);
        if fm == 0.0 {
            return mid;
        }
        if (fm < 0.0) == lo_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
