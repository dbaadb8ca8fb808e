//! MDS matrix construction and checks.

use crate::error::{ErrorCode, PoseidonResult};
use crate::field::Fr;
use serde::{Serialize, Serializer};

/// Square matrix over Fr, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsMatrix {
    width: usize,
    entries: Vec<Fr>,
}

impl MdsMatrix {
    /// Build from rows. Every row must have as many entries as there are rows.
    pub fn from_rows(rows: Vec<Vec<Fr>>) -> PoseidonResult<Self> {
        let width = rows.len();
        if width == 0 {
            return Err(ErrorCode::InvalidParameters("empty MDS matrix".to_string()));
        }
        let mut entries = Vec::with_capacity(width * width);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ErrorCode::InvalidParameters(format!(
                    "MDS row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            entries.extend(row);
        }
        Ok(Self { width, entries })
    }

    /// Cauchy matrix `M[i][j] = 1 / (xs[i] + ys[j])`.
    ///
    /// Fails with `WeakParameters` when the `2t` points are not pairwise
    /// distinct or a denominator vanishes.
    pub fn cauchy(xs: &[Fr], ys: &[Fr]) -> PoseidonResult<Self> {
        if xs.len() != ys.len() || xs.is_empty() {
            return Err(ErrorCode::InvalidParameters(format!(
                "Cauchy sequences must be non-empty and equal length ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }

        let points: Vec<&Fr> = xs.iter().chain(ys.iter()).collect();
        for (i, a) in points.iter().enumerate() {
            if points[i + 1..].iter().any(|b| b == a) {
                return Err(ErrorCode::WeakParameters(
                    "Cauchy points are not pairwise distinct".to_string(),
                ));
            }
        }

        let width = xs.len();
        let mut entries = Vec::with_capacity(width * width);
        for x in xs {
            for y in ys {
                let inv = (*x + *y).inverse().ok_or_else(|| {
                    ErrorCode::WeakParameters("Cauchy denominator x + y is zero".to_string())
                })?;
                entries.push(inv);
            }
        }
        Ok(Self { width, entries })
    }

    /// Matrix side length.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Fr {
        self.entries[i * self.width + j]
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[Fr] {
        &self.entries[i * self.width..(i + 1) * self.width]
    }

    /// All rows as owned vectors.
    pub fn rows(&self) -> Vec<Vec<Fr>> {
        self.entries.chunks(self.width).map(<[Fr]>::to_vec).collect()
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let w = self.width;
        let mut entries = Vec::with_capacity(w * w);
        for j in 0..w {
            for i in 0..w {
                entries.push(self.get(i, j));
            }
        }
        Self { width: w, entries }
    }

    /// True if any entry is zero.
    pub fn has_zero_entry(&self) -> bool {
        self.entries.iter().any(Fr::is_zero)
    }

    /// Determinant by Gaussian elimination over Fr.
    pub fn determinant(&self) -> Fr {
        let w = self.width;
        let mut m = self.rows();
        let mut det = Fr::ONE;

        for col in 0..w {
            let pivot_row = match (col..w).find(|&r| !m[r][col].is_zero()) {
                Some(r) => r,
                None => return Fr::ZERO,
            };
            if pivot_row != col {
                m.swap(pivot_row, col);
                det = -det;
            }

            let pivot = m[col][col];
            det = det * pivot;
            let pivot_inv = match pivot.inverse() {
                Some(inv) => inv,
                None => return Fr::ZERO,
            };

            for r in (col + 1)..w {
                let factor = m[r][col] * pivot_inv;
                if factor.is_zero() {
                    continue;
                }
                for c in col..w {
                    let delta = factor * m[col][c];
                    m[r][c] = m[r][c] - delta;
                }
            }
        }
        det
    }

    /// True if the determinant is non-zero.
    pub fn is_invertible(&self) -> bool {
        !self.determinant().is_zero()
    }

    /// Reject matrices with zero entries or a zero determinant.
    pub fn check_strength(&self) -> PoseidonResult<()> {
        if self.has_zero_entry() {
            return Err(ErrorCode::WeakParameters(
                "MDS matrix has a zero entry".to_string(),
            ));
        }
        if !self.is_invertible() {
            return Err(ErrorCode::WeakParameters(
                "MDS matrix is singular".to_string(),
            ));
        }
        Ok(())
    }

    /// `out = M * state`, one dot product per row.
    pub fn mul_vec_into(&self, state: &[Fr], out: &mut [Fr]) {
        for (i, slot) in out.iter_mut().enumerate().take(self.width) {
            let mut sum = Fr::ZERO;
            for (m, s) in self.row(i).iter().zip(state) {
                sum += *m * *s;
            }
            *slot = sum;
        }
    }
}

impl Serialize for MdsMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}
