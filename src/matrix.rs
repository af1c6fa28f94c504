//! Dense `f64` matrix and statistics helpers used by numeric evaluation. A vector is a
//! matrix with a single row.

use crate::error::{MathError, Result};

pub type Matrix = Vec<Vec<f64>>;

fn dimension(message: impl Into<String>) -> MathError {
    MathError::Evaluate(message.into())
}

pub fn shape(m: &[Vec<f64>]) -> (usize, usize) {
    (m.len(), m.first().map_or(0, Vec::len))
}

pub fn is_square(m: &[Vec<f64>]) -> bool {
    let (rows, cols) = shape(m);
    rows == cols && rows > 0
}

/// Flatten a row or column vector. Other shapes are rejected.
pub fn as_vector(m: &[Vec<f64>]) -> Result<Vec<f64>> {
    match shape(m) {
        (1, _) => Ok(m[0].clone()),
        (_, 1) => Ok(m.iter().map(|row| row[0]).collect()),
        (rows, cols) => Err(dimension(format!("expected a vector, got a {rows}x{cols} matrix"))),
    }
}

pub fn identity(n: usize) -> Matrix {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

pub fn map(m: &[Vec<f64>], f: impl Fn(f64) -> f64) -> Matrix {
    m.iter().map(|row| row.iter().map(|v| f(*v)).collect()).collect()
}

pub fn zip_with(a: &[Vec<f64>], b: &[Vec<f64>], f: impl Fn(f64, f64) -> f64) -> Result<Matrix> {
    if shape(a) != shape(b) {
        let (ra, ca) = shape(a);
        let (rb, cb) = shape(b);
        return Err(dimension(format!(
            "dimension mismatch: {ra}x{ca} and {rb}x{cb}"
        )));
    }
    Ok(a.iter()
        .zip(b)
        .map(|(ra, rb)| ra.iter().zip(rb).map(|(x, y)| f(*x, *y)).collect())
        .collect())
}

pub fn multiply(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Matrix> {
    let (ra, ca) = shape(a);
    let (rb, cb) = shape(b);
    if ca != rb {
        return Err(dimension(format!(
            "cannot multiply a {ra}x{ca} matrix by a {rb}x{cb} matrix"
        )));
    }
    Ok((0..ra)
        .map(|i| {
            (0..cb)
                .map(|j| (0..ca).map(|k| a[i][k] * b[k][j]).sum())
                .collect()
        })
        .collect())
}

pub fn transpose(m: &[Vec<f64>]) -> Matrix {
    let (rows, cols) = shape(m);
    (0..cols)
        .map(|j| (0..rows).map(|i| m[i][j]).collect())
        .collect()
}

pub fn trace(m: &[Vec<f64>]) -> Result<f64> {
    if !is_square(m) {
        return Err(dimension("trace requires a square matrix"));
    }
    Ok((0..m.len()).map(|i| m[i][i]).sum())
}

/// Determinant by LU decomposition with partial pivoting.
pub fn det(m: &[Vec<f64>]) -> Result<f64> {
    if !is_square(m) {
        return Err(dimension("determinant requires a square matrix"));
    }
    let n = m.len();
    let mut a = m.to_vec();
    let mut det = 1.0;
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap_or(col);
        if a[pivot][col] == 0.0 {
            return Ok(0.0);
        }
        if pivot != col {
            a.swap(pivot, col);
            det = -det;
        }
        det *= a[col][col];
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    Ok(det)
}

/// Gauss–Jordan inverse.
pub fn inverse(m: &[Vec<f64>]) -> Result<Matrix> {
    if !is_square(m) {
        return Err(dimension("inverse requires a square matrix"));
    }
    let n = m.len();
    let mut a = m.to_vec();
    let mut inv = identity(n);
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(MathError::Evaluate("matrix is singular".to_string()));
        }
        a.swap(pivot, col);
        inv.swap(pivot, col);
        let p = a[col][col];
        for k in 0..n {
            a[col][k] /= p;
            inv[col][k] /= p;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                a[row][k] -= factor * a[col][k];
                inv[row][k] -= factor * inv[col][k];
            }
        }
    }
    Ok(inv)
}

/// Integer power of a square matrix; negative exponents invert first.
pub fn power(m: &[Vec<f64>], exp: i64) -> Result<Matrix> {
    if !is_square(m) {
        return Err(dimension("matrix powers require a square matrix"));
    }
    let mut base = if exp < 0 { inverse(m)? } else { m.to_vec() };
    let mut result = identity(m.len());
    let mut n = exp.unsigned_abs();
    while n > 0 {
        if n % 2 == 1 {
            result = multiply(&result, &base)?;
        }
        base = multiply(&base, &base)?;
        n /= 2;
    }
    Ok(result)
}

pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(dimension(format!(
            "dot product needs vectors of equal length, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

pub fn cross(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    match (a, b) {
        ([a1, a2, a3], [b1, b2, b3]) => Ok(vec![
            a2 * b3 - a3 * b2,
            a3 * b1 - a1 * b3,
            a1 * b2 - a2 * b1,
        ]),
        _ => Err(dimension("cross product needs two vectors of length 3")),
    }
}

/// Frobenius norm, which is the Euclidean length for vectors.
pub fn norm(m: &[Vec<f64>]) -> f64 {
    m.iter().flatten().map(|v| v * v).sum::<f64>().sqrt()
}

fn non_empty<'a>(values: &'a [f64], name: &str) -> Result<&'a [f64]> {
    if values.is_empty() {
        Err(MathError::Evaluate(format!("{name} of an empty list")))
    } else {
        Ok(values)
    }
}

pub fn mean(values: &[f64]) -> Result<f64> {
    let values = non_empty(values, "mean")?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Result<f64> {
    let mut sorted = non_empty(values, "median")?.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Ok(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Sample variance (divides by `n - 1`). A single value has variance zero.
pub fn variance(values: &[f64]) -> Result<f64> {
    let values = non_empty(values, "variance")?;
    if values.len() == 1 {
        return Ok(0.0);
    }
    let m = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok(squares / (values.len() - 1) as f64)
}

pub fn std(values: &[f64]) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinant_tracks_row_swaps() {
        let m = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        assert_eq!(det(&m).unwrap(), -1.0);
    }

    #[test]
    fn inverse_round_trips_to_identity() {
        let m = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let product = multiply(&m, &inverse(&m).unwrap()).unwrap();
        for (i, row) in product.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-12);
            }
        }
    }
}
