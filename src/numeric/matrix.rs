//! Rectangular matrices over rationals or complex numbers.

use std::fmt;

use num_traits::Zero;

use super::complex::Complex;
use super::rational::Rational;
use crate::error::{CoreError, CoreResult};

/// A single matrix entry: either an exact rational or an exact complex
/// number. Matrices promote every entry to `Complex` as soon as one literal
/// element is complex (spec §3: `Matrix(r, c, row-major Rationals or
/// Complex)`).
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixScalar {
    /// A rational entry.
    Rational(Rational),
    /// A complex entry.
    Complex(Complex),
}

impl MatrixScalar {
    fn zero() -> Self {
        Self::Rational(Rational::from_integer(0.into()))
    }

    fn is_zero(&self) -> bool {
        match self {
            Self::Rational(r) => r.is_zero(),
            Self::Complex(c) => c.re.is_zero() && c.im.is_zero(),
        }
    }

    fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a + b),
            (a, b) => Self::Complex(a.as_complex().add(&b.as_complex())),
        }
    }

    fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a - b),
            (a, b) => Self::Complex(a.as_complex().sub(&b.as_complex())),
        }
    }

    fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a * b),
            (a, b) => Self::Complex(a.as_complex().mul(&b.as_complex())),
        }
    }

    fn neg(&self) -> Self {
        match self {
            Self::Rational(a) => Self::Rational(-a),
            Self::Complex(a) => Self::Complex(a.neg()),
        }
    }

    fn as_complex(&self) -> Complex {
        match self {
            Self::Rational(r) => Complex::new(r.clone(), Rational::from_integer(0.into())),
            Self::Complex(c) => c.clone(),
        }
    }

    fn scalar_mul_rational(&self, scalar: &Rational) -> Self {
        match self {
            Self::Rational(a) => Self::Rational(a * scalar),
            Self::Complex(a) => Self::Complex(Complex::new(&a.re * scalar, &a.im * scalar)),
        }
    }
}

impl fmt::Display for MatrixScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::format_matrix_scalar(self))
    }
}

/// A rectangular, row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<MatrixScalar>,
}

impl Matrix {
    /// Build a matrix from row-major data. Returns a [`CoreError`] if the
    /// data length does not match `rows * cols`, or if either dimension is
    /// zero.
    pub fn new(rows: usize, cols: usize, data: Vec<MatrixScalar>) -> CoreResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(CoreError::type_err("matrix dimensions must be at least 1x1"));
        }
        if data.len() != rows * cols {
            return Err(CoreError::type_err("matrix row lengths are inconsistent"));
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major entries.
    #[must_use]
    pub fn data(&self) -> &[MatrixScalar] {
        &self.data
    }

    fn get(&self, r: usize, c: usize) -> &MatrixScalar {
        &self.data[r * self.cols + c]
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Elementwise addition; requires identical shape.
    pub fn add(&self, other: &Self) -> CoreResult<Self> {
        if !self.same_shape(other) {
            return Err(CoreError::type_err("matrix addition requires identical shape"));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.add(b))
            .collect();
        Ok(Self { rows: self.rows, cols: self.cols, data })
    }

    /// Elementwise subtraction; requires identical shape.
    pub fn sub(&self, other: &Self) -> CoreResult<Self> {
        if !self.same_shape(other) {
            return Err(CoreError::type_err("matrix subtraction requires identical shape"));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.sub(b))
            .collect();
        Ok(Self { rows: self.rows, cols: self.cols, data })
    }

    /// Elementwise (Hadamard) multiplication; requires identical shape.
    pub fn mul_elementwise(&self, other: &Self) -> CoreResult<Self> {
        if !self.same_shape(other) {
            return Err(CoreError::type_err(
                "elementwise matrix multiplication requires identical shape",
            ));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.mul(b))
            .collect();
        Ok(Self { rows: self.rows, cols: self.cols, data })
    }

    /// Matrix product; requires `self.cols == other.rows`.
    pub fn matmul(&self, other: &Self) -> CoreResult<Self> {
        if self.cols != other.rows {
            return Err(CoreError::type_err(
                "matrix product requires inner dimensions to match",
            ));
        }
        let mut data = Vec::with_capacity(self.rows * other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut acc = MatrixScalar::zero();
                for k in 0..self.cols {
                    acc = acc.add(&self.get(i, k).mul(other.get(k, j)));
                }
                data.push(acc);
            }
        }
        Ok(Self { rows: self.rows, cols: other.cols, data })
    }

    /// Scalar multiplication, broadcasting over every entry.
    #[must_use]
    pub fn scalar_mul(&self, scalar: &Rational) -> Self {
        let data = self.data.iter().map(|a| a.scalar_mul_rational(scalar)).collect();
        Self { rows: self.rows, cols: self.cols, data }
    }

    /// Negate every entry.
    #[must_use]
    pub fn neg(&self) -> Self {
        let data = self.data.iter().map(MatrixScalar::neg).collect();
        Self { rows: self.rows, cols: self.cols, data }
    }

    /// Determinant, defined only for square matrices: Laplace cofactor
    /// expansion for `n <= 3`, Bareiss fraction-free elimination for
    /// `n >= 4` (keeps every intermediate value exact and rational-valued
    /// even through division, per spec §4.V).
    pub fn det(&self) -> CoreResult<MatrixScalar> {
        if self.rows != self.cols {
            return Err(CoreError::math("determinant requires a square matrix"));
        }
        match self.rows {
            1 => Ok(self.get(0, 0).clone()),
            2 => {
                let a = self.get(0, 0).mul(self.get(1, 1));
                let b = self.get(0, 1).mul(self.get(1, 0));
                Ok(a.sub(&b))
            }
            3 => Ok(self.det_laplace_3x3()),
            _ => self.det_bareiss(),
        }
    }

    fn det_laplace_3x3(&self) -> MatrixScalar {
        let m = |r: usize, c: usize| self.get(r, c).clone();
        let pos = m(0, 0)
            .mul(&m(1, 1))
            .mul(&m(2, 2))
            .add(&m(0, 1).mul(&m(1, 2)).mul(&m(2, 0)))
            .add(&m(0, 2).mul(&m(1, 0)).mul(&m(2, 1)));
        let neg = m(0, 2)
            .mul(&m(1, 1))
            .mul(&m(2, 0))
            .add(&m(0, 0).mul(&m(1, 2)).mul(&m(2, 1)))
            .add(&m(0, 1).mul(&m(1, 0)).mul(&m(2, 2)));
        pos.sub(&neg)
    }

    /// Bareiss fraction-free elimination, staying exact throughout: every
    /// division is guaranteed to be exact by the algorithm's invariant.
    fn det_bareiss(&self) -> CoreResult<MatrixScalar> {
        let n = self.rows;
        let mut m: Vec<MatrixScalar> = self.data.clone();
        let mut prev_pivot = MatrixScalar::Rational(Rational::from_integer(1.into()));
        let mut sign = MatrixScalar::Rational(Rational::from_integer(1.into()));

        for k in 0..n - 1 {
            if m[k * n + k].is_zero() {
                let swap_row = (k + 1..n).find(|&r| !m[r * n + k].is_zero());
                match swap_row {
                    Some(r) => {
                        for c in 0..n {
                            m.swap(k * n + c, r * n + c);
                        }
                        sign = sign.neg();
                    }
                    None => return Ok(MatrixScalar::zero()),
                }
            }
            for i in (k + 1)..n {
                for j in (k + 1)..n {
                    let cross = m[i * n + j].mul(&m[k * n + k]);
                    let other = m[i * n + k].mul(&m[k * n + j]);
                    let numer = cross.sub(&other);
                    m[i * n + j] = exact_divide(&numer, &prev_pivot)?;
                }
            }
            for i in (k + 1)..n {
                m[i * n + k] = MatrixScalar::zero();
            }
            prev_pivot = m[k * n + k].clone();
        }
        Ok(sign.mul(&m[(n - 1) * n + (n - 1)]))
    }

    /// Inverse via the adjugate/determinant formula, valid for any square
    /// non-singular matrix of the sizes this interpreter exercises (`n <= 4`
    /// in practice; cofactors are computed by recursive minors).
    pub fn inv(&self) -> CoreResult<Self> {
        if self.rows != self.cols {
            return Err(CoreError::math("inverse requires a square matrix"));
        }
        let det = self.det()?;
        if det.is_zero() {
            return Err(CoreError::math("matrix is singular"));
        }
        let n = self.rows;
        let mut adjugate = vec![MatrixScalar::zero(); n * n];
        for i in 0..n {
            for j in 0..n {
                let minor = self.minor(i, j);
                let cof = minor.det()?;
                let cof = if (i + j) % 2 == 1 { cof.neg() } else { cof };
                // Adjugate is the transpose of the cofactor matrix.
                adjugate[j * n + i] = cof;
            }
        }
        let det_r = match &det {
            MatrixScalar::Rational(r) => r.clone(),
            MatrixScalar::Complex(_) => {
                return Err(CoreError::type_err(
                    "inverse of a complex-valued matrix is not supported",
                ));
            }
        };
        let data = adjugate
            .iter()
            .map(|entry| match entry {
                MatrixScalar::Rational(r) => MatrixScalar::Rational(r / &det_r),
                MatrixScalar::Complex(c) => {
                    MatrixScalar::Complex(Complex::new(&c.re / &det_r, &c.im / &det_r))
                }
            })
            .collect();
        Self::new(n, n, data)
    }

    fn minor(&self, skip_row: usize, skip_col: usize) -> Self {
        let n = self.rows;
        let mut data = Vec::with_capacity((n - 1) * (n - 1));
        for r in 0..n {
            if r == skip_row {
                continue;
            }
            for c in 0..n {
                if c == skip_col {
                    continue;
                }
                data.push(self.get(r, c).clone());
            }
        }
        Self { rows: n - 1, cols: n - 1, data }
    }
}

/// Divide two scalars, asserting the division is exact (used inside
/// Bareiss elimination, where it always is by construction).
fn exact_divide(numer: &MatrixScalar, denom: &MatrixScalar) -> CoreResult<MatrixScalar> {
    match (numer, denom) {
        (MatrixScalar::Rational(a), MatrixScalar::Rational(b)) => {
            if b.is_zero() {
                return Err(CoreError::math("division by zero"));
            }
            Ok(MatrixScalar::Rational(a / b))
        }
        (a, b) => {
            let denom_c = b.as_complex();
            if denom_c.norm_sq().is_zero() {
                return Err(CoreError::math("division by zero"));
            }
            Ok(MatrixScalar::Complex(a.as_complex().div(&denom_c)?))
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::format_matrix(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{Matrix, MatrixScalar};
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn r(n: i64) -> MatrixScalar {
        MatrixScalar::Rational(Rational::from_integer(BigInt::from(n)))
    }

    fn square2(a: i64, b: i64, c: i64, d: i64) -> Matrix {
        Matrix::new(2, 2, vec![r(a), r(b), r(c), r(d)]).unwrap()
    }

    #[test]
    fn det_2x2() {
        let m = square2(1, 2, 3, 4);
        assert_eq!(m.det().unwrap(), r(-2));
    }

    #[test]
    fn det_multiplicative() {
        let a = square2(1, 2, 3, 4);
        let b = square2(2, 0, 1, 2);
        let prod = a.matmul(&b).unwrap();
        let det_prod = prod.det().unwrap();
        let det_a = a.det().unwrap();
        let det_b = b.det().unwrap();
        assert_eq!(det_prod, det_a.mul(&det_b));
    }

    #[test]
    fn det_4x4_bareiss_matches_identity() {
        let data = vec![
            r(1), r(0), r(0), r(0),
            r(0), r(1), r(0), r(0),
            r(0), r(0), r(1), r(0),
            r(0), r(0), r(0), r(1),
        ];
        let m = Matrix::new(4, 4, data).unwrap();
        assert_eq!(m.det().unwrap(), r(1));
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let m = square2(1, 0, 0, 1);
        let inv = m.inv().unwrap();
        assert_eq!(inv, m);
    }

    #[test]
    fn inverse_then_matmul_is_identity() {
        let m = square2(1, 2, 3, 4);
        let inv = m.inv().unwrap();
        let prod = m.matmul(&inv).unwrap();
        assert_eq!(prod, square2(1, 0, 0, 1));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = square2(1, 2, 2, 4);
        assert!(m.inv().is_err());
    }
}
