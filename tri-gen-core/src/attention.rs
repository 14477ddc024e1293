//! Scaled dot-product attention over dense row-major matrices.
//!
//! `softmax(Q·Kᵀ / √d_k) · V`, with an optional boolean mask applied to the
//! scores before the softmax. Stateless; the only failure is a shape mismatch.

/// Score given to masked positions so they vanish after the softmax.
const MASKED_SCORE: f64 = -1e9;

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
	rows: usize,
	cols: usize,
	data: Vec<f64>,
}

impl Matrix {
	/// Builds a matrix from row-major data.
	///
	/// # Errors
	/// Returns an error if `data.len() != rows * cols`.
	pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, String> {
		if data.len() != rows * cols {
			return Err(format!("Expected {} values for a {}x{} matrix, got {}", rows * cols, rows, cols, data.len()));
		}
		Ok(Self { rows, cols, data })
	}

	/// Builds a matrix from nested rows.
	///
	/// # Errors
	/// Returns an error if the rows do not all have the same length.
	pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, String> {
		let cols = rows.first().map_or(0, Vec::len);
		if rows.iter().any(|row| row.len() != cols) {
			return Err("All rows must have the same length".to_owned());
		}
		Ok(Self { rows: rows.len(), cols, data: rows.concat() })
	}

	pub fn zeros(rows: usize, cols: usize) -> Self {
		Self { rows, cols, data: vec![0.0; rows * cols] }
	}

	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn cols(&self) -> usize {
		self.cols
	}

	pub fn get(&self, row: usize, col: usize) -> f64 {
		self.data[row * self.cols + col]
	}

	/// One row as a slice.
	pub fn row(&self, row: usize) -> &[f64] {
		&self.data[row * self.cols..(row + 1) * self.cols]
	}

	fn row_mut(&mut self, row: usize) -> &mut [f64] {
		&mut self.data[row * self.cols..(row + 1) * self.cols]
	}
}

/// Boolean mask, `true` where attention is allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
	rows: usize,
	cols: usize,
	allowed: Vec<bool>,
}

impl Mask {
	/// # Errors
	/// Returns an error if `allowed.len() != rows * cols`.
	pub fn new(rows: usize, cols: usize, allowed: Vec<bool>) -> Result<Self, String> {
		if allowed.len() != rows * cols {
			return Err(format!("Expected {} values for a {}x{} mask, got {}", rows * cols, rows, cols, allowed.len()));
		}
		Ok(Self { rows, cols, allowed })
	}

	/// Lower-triangular mask: position `i` may attend to `0..=i`.
	pub fn causal(size: usize) -> Self {
		let allowed = (0..size * size).map(|i| i % size <= i / size).collect();
		Self { rows: size, cols: size, allowed }
	}

	fn is_allowed(&self, row: usize, col: usize) -> bool {
		self.allowed[row * self.cols + col]
	}
}

/// In-place numerically stable softmax.
///
/// Subtracts the max before exponentiating; a zero sum is replaced by 1.
fn softmax(row: &mut [f64]) {
	let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	for value in row.iter_mut() {
		*value = (*value - max).exp();
	}
	let sum: f64 = row.iter().sum();
	let sum = if sum == 0.0 { 1.0 } else { sum };
	for value in row.iter_mut() {
		*value /= sum;
	}
}

/// Computes attention for one sequence.
///
/// - `q`: `seq_len_q × d_k`
/// - `k`: `seq_len_k × d_k`
/// - `v`: `seq_len_k × d_v`
/// - `mask`: optional `seq_len_q × seq_len_k`
///
/// Returns `(output, weights)`: `seq_len_q × d_v` and `seq_len_q × seq_len_k`.
///
/// # Errors
/// Returns an error if the shapes are inconsistent.
pub fn scaled_dot_product_attention(
	q: &Matrix,
	k: &Matrix,
	v: &Matrix,
	mask: Option<&Mask>,
) -> Result<(Matrix, Matrix), String> {
	if q.cols != k.cols {
		return Err("Last dimension of Q and K must match (d_k).".to_owned());
	}
	if k.rows != v.rows {
		return Err(format!("K and V must have the same number of rows, got {} and {}", k.rows, v.rows));
	}
	if let Some(mask) = mask {
		if mask.rows != q.rows || mask.cols != k.rows {
			return Err(format!(
				"Mask must be {}x{}, got {}x{}",
				q.rows, k.rows, mask.rows, mask.cols
			));
		}
	}

	let scale = (q.cols as f64).sqrt();

	// (seq_len_q, seq_len_k)
	let mut weights = Matrix::zeros(q.rows, k.rows);
	for i in 0..q.rows {
		let query = q.row(i);
		let scores = weights.row_mut(i);
		for (j, score) in scores.iter_mut().enumerate() {
			*score = match mask {
				Some(mask) if !mask.is_allowed(i, j) => MASKED_SCORE,
				_ => query.iter().zip(k.row(j)).map(|(a, b)| a * b).sum::<f64>() / scale,
			};
		}
		softmax(scores);
	}

	// (seq_len_q, d_v)
	let mut output = Matrix::zeros(q.rows, v.cols);
	for i in 0..q.rows {
		for j in 0..k.rows {
			let weight = weights.get(i, j);
			for (out, value) in output.row_mut(i).iter_mut().zip(v.row(j)) {
				*out += weight * value;
			}
		}
	}

	Ok((output, weights))
}

/// Applies [`scaled_dot_product_attention`] to every item of a batch.
///
/// # Errors
/// Returns an error if the batch sizes differ or any item has inconsistent shapes.
pub fn batched_attention(
	q: &[Matrix],
	k: &[Matrix],
	v: &[Matrix],
	mask: Option<&[Mask]>,
) -> Result<Vec<(Matrix, Matrix)>, String> {
	if q.len() != k.len() || k.len() != v.len() || mask.is_some_and(|m| m.len() != q.len()) {
		return Err("Q, K, V (and mask) must have the same batch size".to_owned());
	}

	(0..q.len())
		.map(|b| scaled_dot_product_attention(&q[b], &k[b], &v[b], mask.map(|m| &m[b])))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn demo_inputs() -> (Matrix, Matrix, Matrix) {
		let q = Matrix::from_rows(&[vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0], vec![1.0, 1.0, 0.0]]).unwrap();
		let k = Matrix::from_rows(&[vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0], vec![0.0, 1.0, 1.0]]).unwrap();
		let v = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
		(q, k, v)
	}

	#[test]
	fn test_weights_rows_sum_to_one() {
		let (q, k, v) = demo_inputs();
		let (output, weights) = scaled_dot_product_attention(&q, &k, &v, None).unwrap();
		assert_eq!((weights.rows(), weights.cols()), (3, 3));
		assert_eq!((output.rows(), output.cols()), (3, 2));
		for i in 0..3 {
			let sum: f64 = weights.row(i).iter().sum();
			assert!((sum - 1.0).abs() < 1e-12);
		}
	}

	#[test]
	fn test_known_values() {
		let (q, k, v) = demo_inputs();
		let (output, weights) = scaled_dot_product_attention(&q, &k, &v, None).unwrap();

		// Row 1 scores: [0, 1, 1] / sqrt(3)
		let e = (1.0 / 3f64.sqrt()).exp();
		let expected = [1.0 / (1.0 + 2.0 * e), e / (1.0 + 2.0 * e), e / (1.0 + 2.0 * e)];
		for (j, value) in expected.iter().enumerate() {
			assert!((weights.get(1, j) - value).abs() < 1e-12);
		}
		assert!((output.get(1, 0) - (expected[0] + expected[2])).abs() < 1e-12);
		assert!((output.get(1, 1) - (expected[1] + expected[2])).abs() < 1e-12);
	}

	#[test]
	fn test_mask_zeroes_weights() {
		let (q, k, v) = demo_inputs();
		let mask = Mask::causal(3);
		let (output, weights) = scaled_dot_product_attention(&q, &k, &v, Some(&mask)).unwrap();

		assert!((weights.get(0, 0) - 1.0).abs() < 1e-12);
		assert!(weights.get(0, 1) < 1e-12);
		assert!(weights.get(1, 2) < 1e-12);
		assert_eq!(output.row(0), v.row(0));
	}

	#[test]
	fn test_fully_masked_row_is_uniform() {
		let (q, k, v) = demo_inputs();
		let mask = Mask::new(3, 3, vec![false; 9]).unwrap();
		let (_, weights) = scaled_dot_product_attention(&q, &k, &v, Some(&mask)).unwrap();
		for j in 0..3 {
			assert!((weights.get(0, j) - 1.0 / 3.0).abs() < 1e-12);
		}
	}

	#[test]
	fn test_shape_mismatch() {
		let (q, _, v) = demo_inputs();
		let k = Matrix::zeros(3, 2);
		assert_eq!(
			scaled_dot_product_attention(&q, &k, &v, None),
			Err("Last dimension of Q and K must match (d_k).".to_owned())
		);

		let (q, k, _) = demo_inputs();
		assert!(scaled_dot_product_attention(&q, &k, &Matrix::zeros(2, 2), None).is_err());
		assert!(scaled_dot_product_attention(&q, &k, &q, Some(&Mask::causal(2))).is_err());
		assert!(Matrix::new(2, 2, vec![1.0]).is_err());
		assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
	}

	#[test]
	fn test_batched() {
		let (q, k, v) = demo_inputs();
		let results = batched_attention(&[q.clone(), q.clone()], &[k.clone(), k.clone()], &[v.clone(), v.clone()], None).unwrap();
		assert_eq!(results.len(), 2);
		assert_eq!(results[0], results[1]);
		assert!(batched_attention(&[q], &[], &[v], None).is_err());
	}
}
