use rustdct::DctPlanner;
use transpose::transpose_inplace;

/// In-place 2-D DCT-II of a square, row-major matrix of side `dimension`.
pub fn dct_2d(values: &mut [f64], dimension: usize) {
    assert_eq!(values.len(), dimension * dimension);

    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(dimension);

    //rows
    values.chunks_exact_mut(dimension).for_each(|row| {
        dct.process_dct2(row);
    });

    let mut scratch = vec![0f64; dimension];
    transpose_inplace(values, &mut scratch, dimension, dimension);

    //columns (now laid out as rows)
    values.chunks_exact_mut(dimension).for_each(|col| {
        dct.process_dct2(col);
    });

    transpose_inplace(values, &mut scratch, dimension, dimension);
}

/// The top-left `window` x `window` coefficients of a square matrix, row by row.
pub fn top_left_window(values: &[f64], dimension: usize, window: usize) -> Vec<f64> {
    values
        .chunks_exact(dimension)
        .take(window)
        .flat_map(|row| row[..window].iter().copied())
        .collect()
}
