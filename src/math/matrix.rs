use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

use nalgebra as na;
use na::DMatrix;
use thiserror::Error;

use super::vector::{from_hom_point, to_hom_point, Vec3, Vec4};

/// Smallest pivot magnitude accepted by [`Matrix::inverse`].
pub const PIVOT_EPSILON: f32 = 1e-5;

/// Numerical failures of the algebra kernel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraError {
    #[error("cannot invert a {rows}x{columns} matrix, it is not square")]
    NotSquare { rows: usize, columns: usize },
    #[error("matrix is singular: best pivot in column {column} is {pivot}")]
    Singular { column: usize, pivot: f32 },
}

/// Dynamically sized row-major-indexed matrix of `f32`.
///
/// The matrix owns its storage: `clone()` is a deep copy and moving hands the storage over.
/// [`Matrix::take`] moves the contents out of a place that has to stay valid, leaving the
/// empty 0x0 matrix behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: DMatrix<f32>,
}

impl Default for Matrix {
    fn default() -> Self {
        return Self { data: DMatrix::zeros(0, 0) };
    }
}

impl Matrix {
    /// Zero matrix with `rows` rows and `columns` columns.
    pub fn new(rows: usize, columns: usize) -> Self {
        return Self { data: DMatrix::zeros(rows, columns) };
    }

    pub fn identity(n: usize) -> Self {
        return Self { data: DMatrix::identity(n, n) };
    }

    /// Builds a matrix from values listed row after row.
    pub fn from_row_slice(rows: usize, columns: usize, values: &[f32]) -> Self {
        assert_eq!(values.len(), rows * columns, "expected {} values for a {}x{} matrix", rows * columns, rows, columns);
        return Self { data: DMatrix::from_row_slice(rows, columns, values) };
    }

    pub fn rows(&self) -> usize {
        return self.data.nrows();
    }

    pub fn columns(&self) -> usize {
        return self.data.ncols();
    }

    pub fn is_empty(&self) -> bool {
        return self.data.is_empty();
    }

    pub fn is_square(&self) -> bool {
        return self.rows() == self.columns();
    }

    /// Moves the contents out, leaving an empty matrix in `self`.
    pub fn take(&mut self) -> Matrix {
        return std::mem::take(self);
    }

    pub fn transpose(&self) -> Matrix {
        return Self { data: self.data.transpose() };
    }

    /// Sum of the elementwise products of two matrices of the same shape.
    pub fn frobenius_dot(&self, other: &Matrix) -> f32 {
        assert_eq!(
            (self.rows(), self.columns()),
            (other.rows(), other.columns()),
            "frobenius product of differently shaped matrices"
        );
        return self.data.dot(&other.data);
    }

    /// Gauss-Jordan inverse with partial pivoting over the augmented matrix `[M | I]`.
    ///
    /// Fails with [`AlgebraError::Singular`] as soon as the best available pivot is smaller than
    /// [`PIVOT_EPSILON`], the result is not retried with a looser tolerance.
    pub fn inverse(&self) -> Result<Matrix, AlgebraError> {
        if !self.is_square() {
            return Err(AlgebraError::NotSquare { rows: self.rows(), columns: self.columns() });
        }
        let n = self.rows();
        let mut augmented = DMatrix::<f32>::zeros(n, 2 * n);
        for i in 0..n {
            for j in 0..n {
                augmented[(i, j)] = self.data[(i, j)];
            }
            augmented[(i, n + i)] = 1.0;
        }

        for i in 0..n {
            let mut pivot_row = i;
            for r in (i + 1)..n {
                if augmented[(r, i)].abs() > augmented[(pivot_row, i)].abs() {
                    pivot_row = r;
                }
            }
            let pivot = augmented[(pivot_row, i)];
            if pivot.abs() < PIVOT_EPSILON {
                return Err(AlgebraError::Singular { column: i, pivot });
            }
            augmented.swap_rows(i, pivot_row);

            for c in 0..2 * n {
                augmented[(i, c)] /= pivot;
            }
            for r in 0..n {
                if r == i {
                    continue;
                }
                let factor = augmented[(r, i)];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..2 * n {
                    let value = augmented[(i, c)];
                    augmented[(r, c)] -= factor * value;
                }
            }
        }

        return Ok(Self { data: DMatrix::from_fn(n, n, |r, c| augmented[(r, c + n)]) });
    }

    /// 4x1 homogeneous column for a point, w = 1.
    pub fn from_point(v: Vec3) -> Matrix {
        return Self::from_vec4(to_hom_point(v));
    }

    /// 4x1 column holding `v` as is.
    pub fn from_vec4(v: Vec4) -> Matrix {
        return Self { data: DMatrix::from_column_slice(4, 1, v.as_slice()) };
    }

    /// Reads a 4x1 column back as a point, dividing by its w component.
    pub fn to_point(&self) -> Vec3 {
        return from_hom_point(self.to_vec4());
    }

    pub fn to_vec4(&self) -> Vec4 {
        assert!(self.rows() == 4 && self.columns() == 1, "expected a 4x1 column, got {}x{}", self.rows(), self.columns());
        return Vec4::new(self.data[(0, 0)], self.data[(1, 0)], self.data[(2, 0)], self.data[(3, 0)]);
    }

    /// `self * v` for a 4x4 matrix without going through a temporary column matrix.
    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        assert!(self.rows() == 4 && self.columns() == 4, "expected a 4x4 transform, got {}x{}", self.rows(), self.columns());
        let m = &self.data;
        return Vec4::from_fn(|r, _| m[(r, 0)] * v.x + m[(r, 1)] * v.y + m[(r, 2)] * v.z + m[(r, 3)] * v.w);
    }

    /// Transforms a point and projects it back to 3-space.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        return from_hom_point(self.transform_vec4(to_hom_point(v)));
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, index: (usize, usize)) -> &f32 {
        return &self.data[index];
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f32 {
        return &mut self.data[index];
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.columns(),
            rhs.rows(),
            "cannot multiply {}x{} by {}x{}",
            self.rows(),
            self.columns(),
            rhs.rows(),
            rhs.columns()
        );
        return Matrix { data: &self.data * &rhs.data };
    }
}

impl Mul<Matrix> for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        return &self * &rhs;
    }
}

impl Mul<f32> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f32) -> Matrix {
        return Matrix { data: &self.data * rhs };
    }
}

impl Mul<&Matrix> for f32 {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        return rhs * self;
    }
}

impl Add<&Matrix> for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        assert_eq!((self.rows(), self.columns()), (rhs.rows(), rhs.columns()), "cannot add differently shaped matrices");
        return Matrix { data: &self.data + &rhs.data };
    }
}

impl Sub<&Matrix> for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        assert_eq!((self.rows(), self.columns()), (rhs.rows(), rhs.columns()), "cannot subtract differently shaped matrices");
        return Matrix { data: &self.data - &rhs.data };
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows() {
            for c in 0..self.columns() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[(r, c)])?;
            }
            writeln!(f)?;
        }
        return Ok(());
    }
}
