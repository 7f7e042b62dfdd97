use rayon::prelude::*;

use crate::error::MorphologyError;
use crate::kernel::{
    is_pass_through, parabolic_line_with, LineScratch, MorphMode, ParabolicAlgorithm,
};
use crate::lines::LineLayout;
use crate::parallel::CancellationToken;

fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<(), MorphologyError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(MorphologyError::Cancelled),
        _ => Ok(()),
    }
}

/// Run one parabolic pass per axis over a row-major `f64` buffer, in place.
///
/// Axes are visited in order `0..D`; axes with a pass-through curvature are
/// skipped. `lines` is the line-major scratch used by the strided parallel
/// passes and is grown on demand, so it can be shared across calls.
#[allow(clippy::too_many_arguments)]
pub(crate) fn parabolic_passes<const D: usize>(
    work: &mut [f64],
    lines: &mut Vec<f64>,
    size: [usize; D],
    curvatures: &[f64; D],
    mode: MorphMode,
    algorithm: ParabolicAlgorithm,
    parallel: bool,
    cancel: Option<&CancellationToken>,
) -> Result<(), MorphologyError> {
    if work.is_empty() {
        return Ok(());
    }

    for (axis, &c) in curvatures.iter().enumerate() {
        if is_pass_through(c) {
            if c.is_finite() {
                log::warn!("axis {axis}: degenerate curvature {c}, leaving the axis unchanged");
            } else {
                log::trace!("axis {axis}: zero scale, skipped");
            }
            continue;
        }

        let layout = LineLayout::new(&size, axis)?;
        if layout.line_len() < 2 {
            log::trace!("axis {axis}: single-sample lines, skipped");
            continue;
        }

        log::debug!(
            "{mode:?} axis {axis}: {} lines of {} samples, c = {c}, {algorithm:?}, parallel: {parallel}",
            layout.num_lines(),
            layout.line_len(),
        );

        if layout.is_contiguous() {
            contiguous_pass(work, &layout, c, mode, algorithm, parallel, cancel)?;
        } else if parallel {
            strided_pass_parallel(work, lines, &layout, c, mode, algorithm, cancel)?;
        } else {
            strided_pass_serial(work, &layout, c, mode, algorithm, cancel)?;
        }
    }

    Ok(())
}

/// Lines along the last axis are contiguous rows and are filtered in place.
fn contiguous_pass(
    work: &mut [f64],
    layout: &LineLayout,
    c: f64,
    mode: MorphMode,
    algorithm: ParabolicAlgorithm,
    parallel: bool,
    cancel: Option<&CancellationToken>,
) -> Result<(), MorphologyError> {
    let len = layout.line_len();
    if parallel {
        work.par_chunks_mut(len).try_for_each_init(
            || LineScratch::with_capacity(len),
            |scratch, row| {
                check_cancelled(cancel)?;
                parabolic_line_with(row, c, mode, algorithm, scratch);
                Ok::<(), MorphologyError>(())
            },
        )
    } else {
        let mut scratch = LineScratch::with_capacity(len);
        for row in work.chunks_mut(len) {
            check_cancelled(cancel)?;
            parabolic_line_with(row, c, mode, algorithm, &mut scratch);
        }
        Ok(())
    }
}

/// Gather every line into a line-major buffer, filter, then scatter the
/// disjoint outer blocks back.
fn strided_pass_parallel(
    work: &mut [f64],
    lines: &mut Vec<f64>,
    layout: &LineLayout,
    c: f64,
    mode: MorphMode,
    algorithm: ParabolicAlgorithm,
    cancel: Option<&CancellationToken>,
) -> Result<(), MorphologyError> {
    let len = layout.line_len();
    lines.resize(work.len(), 0.0);

    {
        let src: &[f64] = work;
        lines.par_chunks_mut(len).enumerate().try_for_each_init(
            || LineScratch::with_capacity(len),
            |scratch, (index, line)| {
                check_cancelled(cancel)?;
                layout.extract(src, &layout.descriptor(index), line);
                parabolic_line_with(line, c, mode, algorithm, scratch);
                Ok::<(), MorphologyError>(())
            },
        )?;
    }

    let filtered: &[f64] = lines;
    work.par_chunks_mut(layout.block_len())
        .enumerate()
        .for_each(|(block, dst)| layout.write_block(block, dst, filtered));

    Ok(())
}

fn strided_pass_serial(
    work: &mut [f64],
    layout: &LineLayout,
    c: f64,
    mode: MorphMode,
    algorithm: ParabolicAlgorithm,
    cancel: Option<&CancellationToken>,
) -> Result<(), MorphologyError> {
    let mut buf = vec![0.0; layout.line_len()];
    let mut scratch = LineScratch::with_capacity(layout.line_len());
    for line in layout.lines() {
        check_cancelled(cancel)?;
        layout.extract(work, &line, &mut buf);
        parabolic_line_with(&mut buf, c, mode, algorithm, &mut scratch);
        layout.write_back(work, &line, &buf);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::parabolic_line_brute_force;

    fn run(
        data: &[f64],
        size: [usize; 2],
        curvatures: [f64; 2],
        mode: MorphMode,
        parallel: bool,
    ) -> Result<Vec<f64>, MorphologyError> {
        let mut work = data.to_vec();
        let mut lines = Vec::new();
        parabolic_passes(
            &mut work,
            &mut lines,
            size,
            &curvatures,
            mode,
            ParabolicAlgorithm::Auto,
            parallel,
            None,
        )?;
        Ok(work)
    }

    #[test]
    fn test_columns_match_line_kernel() -> Result<(), MorphologyError> {
        // 4 rows x 3 columns, only axis 0 processed
        #[rustfmt::skip]
        let data = vec![
            0.0, 9.0, 1.0,
            4.0, 0.0, 2.0,
            9.0, 3.0, 8.0,
            1.0, 7.0, 0.0,
        ];
        for parallel in [false, true] {
            let out = run(&data, [4, 3], [0.7, f64::INFINITY], MorphMode::Erode, parallel)?;
            for col in 0..3 {
                let column: Vec<f64> = (0..4).map(|r| data[r * 3 + col]).collect();
                let expected = parabolic_line_brute_force(&column, 0.7, MorphMode::Erode);
                for r in 0..4 {
                    assert!((out[r * 3 + col] - expected[r]).abs() < 1e-12);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_serial_and_parallel_agree() -> Result<(), MorphologyError> {
        let data: Vec<f64> = (0..60).map(|v| ((v * 37) % 23) as f64).collect();
        let serial = run(&data, [6, 10], [0.3, 2.0], MorphMode::Dilate, false)?;
        let parallel = run(&data, [6, 10], [0.3, 2.0], MorphMode::Dilate, true)?;
        assert_eq!(serial, parallel);
        Ok(())
    }

    #[test]
    fn test_empty_buffer() -> Result<(), MorphologyError> {
        let out = run(&[], [0, 4], [1.0, 1.0], MorphMode::Erode, true)?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_cancelled_before_first_line() {
        let token = CancellationToken::new();
        token.cancel();
        let mut work = vec![1.0; 12];
        let res = parabolic_passes(
            &mut work,
            &mut Vec::new(),
            [3, 4],
            &[1.0, 1.0],
            MorphMode::Erode,
            ParabolicAlgorithm::Auto,
            false,
            Some(&token),
        );
        assert_eq!(res, Err(MorphologyError::Cancelled));
    }
}
