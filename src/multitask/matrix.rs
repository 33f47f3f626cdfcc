use rand::prelude::Distribution;
use rand::Rng;
use std::fmt;

/// Rectangular numeric table.
///
/// All values of one matrix live in a single flat allocation, row by
/// row:
/// `data = [row_1][row_2] ... [row_R]`
/// Each row holds `cols` values, so the element at `(row, col)` sits at
/// `row * cols + col`. The matrix exclusively owns its storage; it is
/// mutated in place during training and never shared.
pub(crate) struct Matrix {
    rows: usize,
    cols: usize,
    data: Box<[f64]>,
}

impl Matrix {
    /// Returns a matrix whose every element is drawn independently and
    /// uniformly from the half-open interval [-1, 1).
    pub(crate) fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let between = rand::distributions::Uniform::from(-1.0..1.0);

        let mut data = Vec::with_capacity(rows * cols);
        data.extend(between.sample_iter(&mut *rng).take(rows * cols));

        Matrix {
            rows,
            cols,
            data: data.into_boxed_slice(),
        }
    }

    /// Builds a matrix from the given row-major values.
    ///
    /// # Returns
    /// * `Ok(Matrix)` if `values` holds exactly `rows * cols` elements;
    /// * `Err(SizeMismatch)` otherwise.
    pub(crate) fn from_values(
        rows: usize,
        cols: usize,
        values: &[f64],
    ) -> Result<Matrix, SizeMismatch> {
        if values.len() != rows * cols {
            return Err(SizeMismatch {
                expected: rows * cols,
                got: values.len(),
            });
        }

        Ok(Matrix {
            rows,
            cols,
            data: values.to_owned().into_boxed_slice(),
        })
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    /// Flat row-major view of all values.
    pub(crate) fn values(&self) -> &[f64] {
        &self.data
    }

    /// Calculates the row-vector product `v · M`, writing one value per
    /// column into `out`.
    ///
    /// # Returns
    /// * `Ok(())` if `v` has one value per row and `out` one per column;
    /// * `Err(SizeMismatch)` otherwise.
    pub(crate) fn vec_mul(&self, v: &[f64], out: &mut [f64]) -> Result<(), SizeMismatch> {
        if v.len() != self.rows {
            return Err(SizeMismatch {
                expected: self.rows,
                got: v.len(),
            });
        }
        if out.len() != self.cols {
            return Err(SizeMismatch {
                expected: self.cols,
                got: out.len(),
            });
        }

        for o in out.iter_mut() {
            *o = 0.0;
        }
        for (&vj, row) in v.iter().zip(self.data.chunks(self.cols)) {
            for (o, &w) in out.iter_mut().zip(row.iter()) {
                *o += vj * w;
            }
        }

        Ok(())
    }

    /// Accumulates the matrix-vector product `M · v` into `out`, adding
    /// one value per row. Accumulating lets several matrices map their
    /// output-space gradient signals back into one shared upstream
    /// space.
    ///
    /// # Returns
    /// * `Ok(())` if `v` has one value per column and `out` one per row;
    /// * `Err(SizeMismatch)` otherwise.
    pub(crate) fn mul_vec_acc(&self, v: &[f64], out: &mut [f64]) -> Result<(), SizeMismatch> {
        if v.len() != self.cols {
            return Err(SizeMismatch {
                expected: self.cols,
                got: v.len(),
            });
        }
        if out.len() != self.rows {
            return Err(SizeMismatch {
                expected: self.rows,
                got: out.len(),
            });
        }

        for (o, row) in out.iter_mut().zip(self.data.chunks(self.cols)) {
            *o += row.iter().zip(v.iter()).map(|(&w, &x)| w * x).sum::<f64>();
        }

        Ok(())
    }

    /// Adds the scaled outer product of two vectors in place:
    /// `M[j][k] += scale * rows_v[j] * cols_v[k]`.
    ///
    /// # Returns
    /// * `Ok(())` if `rows_v` has one value per row and `cols_v` one per
    ///   column;
    /// * `Err(SizeMismatch)` otherwise.
    pub(crate) fn add_scaled_outer(
        &mut self,
        rows_v: &[f64],
        cols_v: &[f64],
        scale: f64,
    ) -> Result<(), SizeMismatch> {
        if rows_v.len() != self.rows {
            return Err(SizeMismatch {
                expected: self.rows,
                got: rows_v.len(),
            });
        }
        if cols_v.len() != self.cols {
            return Err(SizeMismatch {
                expected: self.cols,
                got: cols_v.len(),
            });
        }

        for (&a, row) in rows_v.iter().zip(self.data.chunks_mut(self.cols)) {
            for (w, &d) in row.iter_mut().zip(cols_v.iter()) {
                *w += scale * a * d;
            }
        }

        Ok(())
    }
}

/// Returns a vector whose every element is drawn independently and
/// uniformly from the half-open interval [-1, 1).
pub(crate) fn random_vector<R: Rng>(len: usize, rng: &mut R) -> Box<[f64]> {
    let between = rand::distributions::Uniform::from(-1.0..1.0);

    let mut data = Vec::with_capacity(len);
    data.extend(between.sample_iter(&mut *rng).take(len));

    data.into_boxed_slice()
}

/// Error structure for collections size mismatch
#[derive(Debug, Clone)]
pub struct SizeMismatch {
    pub expected: usize,
    pub got: usize,
}

impl fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Expected {} values, but got {}!",
            self.expected, self.got
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn vec_mul_computes_row_vector_product() {
        let m = Matrix::from_values(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut out = [0.0; 3];
        m.vec_mul(&[2.0, 0.5], &mut out).unwrap();
        assert_eq!(out, [4.0, 6.5, 9.0]);
    }

    #[test]
    fn mul_vec_acc_adds_matrix_vector_product() {
        let m = Matrix::from_values(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut out = [10.0, 20.0];
        m.mul_vec_acc(&[1.0, 0.0, -1.0], &mut out).unwrap();
        assert_eq!(out, [8.0, 18.0]);
    }

    #[test]
    fn add_scaled_outer_updates_every_element() {
        let mut m = Matrix::from_values(2, 3, &[0.0; 6]).unwrap();
        m.add_scaled_outer(&[1.0, 2.0], &[3.0, 4.0, 5.0], 0.5).unwrap();
        assert_eq!(m.values(), &[1.5, 2.0, 2.5, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn products_reject_mismatched_widths() {
        let m = Matrix::from_values(2, 3, &[0.0; 6]).unwrap();
        let mut out = [0.0; 3];
        assert!(m.vec_mul(&[1.0, 2.0, 3.0], &mut out).is_err());
        assert!(m.mul_vec_acc(&[1.0, 2.0], &mut out[..2]).is_err());
        assert!(Matrix::from_values(2, 3, &[0.0; 5]).is_err());
    }

    #[test]
    fn random_draws_from_half_open_unit_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let m = Matrix::random(20, 20, &mut rng);
        for &v in m.values() {
            assert!(v >= -1.0 && v < 1.0);
        }

        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            Matrix::random(3, 4, &mut a).values(),
            Matrix::random(3, 4, &mut b).values()
        );
    }
}
