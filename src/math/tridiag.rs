/// Solves the tridiagonal system `a[i] x[i-1] + b[i] x[i] + c[i] x[i+1] = d[i]`
/// with the Thomas algorithm.
///
/// `a[0]` and `c[n-1]` are ignored. The system must be diagonally dominant
/// (or otherwise not need pivoting); a zero pivot yields non-finite values.
///
/// The spline solver relaxes each joint independently and does not use this;
/// it is kept for callers that want to experiment with a full linearised solve.
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> Vec<f64> {
    let n = d.len();
    debug_assert!(a.len() == n && b.len() == n && c.len() == n);
    if n == 0 {
        return vec![];
    }

    let mut b = b.to_vec();
    let mut d = d.to_vec();
    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m * c[i - 1];
        d[i] -= m * d[i - 1];
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = (d[i] - c[i] * x[i + 1]) / b[i];
    }
    x
}
