//! Subresultants, Resultants and Discriminants.
//!
//! All quantities are defined by the classical determinant formulas over the
//! Sylvester-type matrix whose rows are `x^(n-j-1) p, ..., p, x^(m-j-1) q,
//! ..., q` (with `m = deg p`, `n = deg q` in the eliminated variable) and whose
//! columns are indexed by the powers `x^(m+n-j-1)` down to `x^0`.
//!
//! - `psc_j(p, q)`: determinant of the leading square block of width
//!   `m + n - 2j` (the j-th principal subresultant coefficient).
//! - `S_j(p, q)`: the j-th subresultant polynomial, `sum_i det(M_j^(i)) x^i`.
//! - `res(p, q) = psc_0(p, q)`.
//! - `disc(p) = (-1)^(m(m-1)/2) res(p, p') / lc(p)`.
//!
//! Determinants of polynomial matrices are computed with Bareiss'
//! fraction-free elimination, where every division is exact.
//!
//! ## References
//!
//! - Collins, "Subresultants and Reduced Polynomial Remainder Sequences" (1967)
//! - Brown and Traub, "On Euclid's Algorithm and the Theory of Subresultants" (1971)
//! - "Algorithms in Real Algebraic Geometry" (Basu et al., 2006), Chapter 8

use crate::polynomial::{Polynomial, Var};
use crate::{MathError, MathResult};

/// The j-th principal subresultant coefficient of `p` and `q` in `var`.
///
/// Defined for `0 <= j <= min(deg p, deg q)`; `psc_0` is the resultant.
pub fn psc(p: &Polynomial, q: &Polynomial, var: Var, j: u32) -> MathResult<Polynomial> {
    if p.is_zero() || q.is_zero() {
        return Ok(Polynomial::zero());
    }
    let pc = p.coefficients(var);
    let qc = q.coefficients(var);
    let (m, n, j) = (pc.len() - 1, qc.len() - 1, j as usize);
    if j > m.min(n) {
        return Err(MathError::InvalidArgument(format!(
            "psc index {} exceeds min degree {}",
            j,
            m.min(n)
        )));
    }
    let rows = sylvester_rows(&pc, &qc, j);
    let width = m + n - 2 * j;
    let square: Vec<Vec<Polynomial>> = rows.iter().map(|r| r[..width].to_vec()).collect();
    determinant(square)
}

/// All principal subresultant coefficients `psc_0 .. psc_{k-1}` where
/// `k = min(deg p, deg q)`.
pub fn psc_sequence(p: &Polynomial, q: &Polynomial, var: Var) -> MathResult<Vec<Polynomial>> {
    let k = p.degree(var).min(q.degree(var));
    (0..k).map(|j| psc(p, q, var, j)).collect()
}

/// The k-th subresultant polynomial of `p` and `q` in `var`.
///
/// Defined for `0 <= k < min(deg p, deg q)`.
pub fn sres(p: &Polynomial, q: &Polynomial, var: Var, k: u32) -> MathResult<Polynomial> {
    if p.is_zero() || q.is_zero() {
        return Ok(Polynomial::zero());
    }
    let pc = p.coefficients(var);
    let qc = q.coefficients(var);
    let (m, n, k) = (pc.len() - 1, qc.len() - 1, k as usize);
    if k >= m.min(n) {
        return Err(MathError::InvalidArgument(format!(
            "subresultant index {} must be below min degree {}",
            k,
            m.min(n)
        )));
    }
    let rows = sylvester_rows(&pc, &qc, k);
    let lead = m + n - 2 * k - 1;
    let mut coeffs = Vec::with_capacity(k + 1);
    for i in 0..=k {
        let col = m + n - k - 1 - i;
        let square: Vec<Vec<Polynomial>> = rows
            .iter()
            .map(|r| {
                let mut row = r[..lead].to_vec();
                row.push(r[col].clone());
                row
            })
            .collect();
        coeffs.push(determinant(square)?);
    }
    Ok(Polynomial::from_coefficients(var, &coeffs))
}

/// Resultant of `p` and `q` with respect to `var`.
pub fn resultant(p: &Polynomial, q: &Polynomial, var: Var) -> MathResult<Polynomial> {
    psc(p, q, var, 0)
}

/// Discriminant of `p` with respect to `var`, normalised by the leading
/// coefficient. Polynomials of degree at most one have discriminant one.
pub fn discriminant(p: &Polynomial, var: Var) -> MathResult<Polynomial> {
    let m = p.degree(var);
    if m <= 1 {
        return Ok(Polynomial::one());
    }
    let res = resultant(p, &p.derivative(var), var)?;
    let lc = p.leading_coeff_wrt(var);
    let d = res
        .div_exact(&lc)
        .ok_or_else(|| MathError::NotExact(format!("discriminant of {}", p)))?;
    if (m * (m - 1) / 2) % 2 == 1 {
        Ok(d.neg())
    } else {
        Ok(d)
    }
}

/// Rows of the subresultant matrix for index `j`.
///
/// `p` and `q` are coefficient vectors indexed by degree with non-zero last
/// entries. Column `c` holds the coefficient of `x^(m+n-j-1-c)`.
fn sylvester_rows(p: &[Polynomial], q: &[Polynomial], j: usize) -> Vec<Vec<Polynomial>> {
    let m = p.len() - 1;
    let n = q.len() - 1;
    let cols = m + n - j;
    let mut rows = Vec::with_capacity(m + n - 2 * j);
    let mut push_shifts = |coeffs: &[Polynomial], count: usize| {
        for shift in (0..count).rev() {
            let mut row = vec![Polynomial::zero(); cols];
            for (i, c) in coeffs.iter().enumerate() {
                let power = shift + i;
                row[cols - 1 - power] = c.clone();
            }
            rows.push(row);
        }
    };
    push_shifts(p, n - j);
    push_shifts(q, m - j);
    rows
}

/// Determinant of a square polynomial matrix by Bareiss elimination.
pub fn determinant(mut m: Vec<Vec<Polynomial>>) -> MathResult<Polynomial> {
    let n = m.len();
    if n == 0 {
        return Ok(Polynomial::one());
    }
    let mut negate = false;
    let mut prev = Polynomial::one();
    for k in 0..n - 1 {
        if m[k][k].is_zero() {
            match (k + 1..n).find(|&i| !m[i][k].is_zero()) {
                Some(i) => {
                    m.swap(k, i);
                    negate = !negate;
                }
                None => return Ok(Polynomial::zero()),
            }
        }
        for i in k + 1..n {
            for j in k + 1..n {
                let num = Polynomial::sub(
                    &Polynomial::mul(&m[i][j], &m[k][k]),
                    &Polynomial::mul(&m[i][k], &m[k][j]),
                );
                m[i][j] = num
                    .div_exact(&prev)
                    .ok_or_else(|| MathError::NotExact("Bareiss step".to_string()))?;
            }
            m[i][k] = Polynomial::zero();
        }
        prev = m[k][k].clone();
    }
    let det = m[n - 1][n - 1].clone();
    Ok(if negate { det.neg() } else { det })
}
