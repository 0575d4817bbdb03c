//! Contiguous training sets.
//!
//! The trainer walks the samples by slice to keep epochs allocation-free.
//! [`Dataset`] stores the input and ideal matrices row-major with validated
//! shapes.

use crate::{Error, Result};

/// Supervised training pairs: inputs and the ideal outputs for them.
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `ideals.len() == len * ideal_dim`
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<f64>,
    ideals: Vec<f64>,
    len: usize,
    input_dim: usize,
    ideal_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `ideals` is `(len, ideal_dim)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        ideals: Vec<f64>,
        input_dim: usize,
        ideal_dim: usize,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if ideal_dim == 0 {
            return Err(Error::InvalidData("ideal_dim must be > 0".to_owned()));
        }
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {input_dim}",
                inputs.len()
            )));
        }

        let len = inputs.len() / input_dim;
        if ideals.len() != len * ideal_dim {
            return Err(Error::InvalidData(format!(
                "ideals length {} does not match len * ideal_dim ({len} * {ideal_dim})",
                ideals.len()
            )));
        }

        Ok(Self {
            inputs,
            ideals,
            len,
            input_dim,
            ideal_dim,
        })
    }

    /// Build a dataset from per-sample rows (copied into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], ideals: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != ideals.len() {
            return Err(Error::InvalidData(format!(
                "inputs/ideals length mismatch: {} vs {}",
                inputs.len(),
                ideals.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }

        let input_dim = inputs[0].len();
        let ideal_dim = ideals[0].len();
        let inputs = flatten("input", inputs, input_dim)?;
        let ideals = flatten("ideal", ideals, ideal_dim)?;
        Self::from_flat(inputs, ideals, input_dim, ideal_dim)
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn ideal_dim(&self) -> usize {
        self.ideal_dim
    }

    #[inline]
    /// Returns the `idx`-th input row.
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th ideal row.
    ///
    /// Panics if `idx >= len`.
    pub fn ideal(&self, idx: usize) -> &[f64] {
        let start = idx * self.ideal_dim;
        &self.ideals[start..start + self.ideal_dim]
    }

    /// Iterate `(input, ideal)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        (0..self.len).map(|idx| (self.input(idx), self.ideal(idx)))
    }
}

fn flatten(what: &str, rows: &[Vec<f64>], dim: usize) -> Result<Vec<f64>> {
    let mut flat = Vec::with_capacity(rows.len() * dim);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(Error::InvalidData(format!(
                "{what} row {i} has len {}, expected {dim}",
                row.len()
            )));
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}
