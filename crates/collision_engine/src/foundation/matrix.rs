//! Generic row-major matrix helpers over flat slices
//!
//! These work on arbitrary `rows x cols` buffers, so dimension mistakes are
//! reported through [`MatrixError`] instead of panicking. The output buffer is
//! only written when the call succeeds.

use thiserror::Error;

/// Errors from the generic matrix helpers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixError {
    /// Inner dimensions of a product do not agree
    #[error("Dimension mismatch: {a_rows}x{a_cols} * {b_rows}x{b_cols}")]
    DimensionMismatch {
        /// Rows of the left operand
        a_rows: usize,
        /// Columns of the left operand
        a_cols: usize,
        /// Rows of the right operand
        b_rows: usize,
        /// Columns of the right operand
        b_cols: usize,
    },

    /// A buffer is smaller or larger than its declared dimensions
    #[error("Buffer size mismatch: expected {expected} elements, found {actual}")]
    BufferSize {
        /// Element count implied by the dimensions
        expected: usize,
        /// Actual slice length
        actual: usize,
    },
}

fn check_len(buffer_len: usize, rows: usize, cols: usize) -> Result<(), MatrixError> {
    let expected = rows * cols;
    if buffer_len == expected {
        Ok(())
    } else {
        Err(MatrixError::BufferSize { expected, actual: buffer_len })
    }
}

/// Transpose a `rows x cols` matrix into `out` (`cols x rows`)
pub fn transpose(src: &[f32], rows: usize, cols: usize, out: &mut [f32]) -> Result<(), MatrixError> {
    check_len(src.len(), rows, cols)?;
    check_len(out.len(), cols, rows)?;

    for row in 0..rows {
        for col in 0..cols {
            out[col * rows + row] = src[row * cols + col];
        }
    }
    Ok(())
}

/// Multiply `a` (`a_rows x a_cols`) by `b` (`b_rows x b_cols`) into `out`
pub fn multiply(
    out: &mut [f32],
    a: &[f32],
    a_rows: usize,
    a_cols: usize,
    b: &[f32],
    b_rows: usize,
    b_cols: usize,
) -> Result<(), MatrixError> {
    if a_cols != b_rows {
        return Err(MatrixError::DimensionMismatch { a_rows, a_cols, b_rows, b_cols });
    }
    check_len(a.len(), a_rows, a_cols)?;
    check_len(b.len(), b_rows, b_cols)?;
    check_len(out.len(), a_rows, b_cols)?;

    for i in 0..a_rows {
        for j in 0..b_cols {
            out[i * b_cols + j] = (0..a_cols)
                .map(|k| a[i * a_cols + k] * b[k * b_cols + j])
                .sum();
        }
    }
    Ok(())
}
