/// One sharpening step: move every sample to its closer envelope.
///
/// A sample becomes the dilation when it is closer to it than to the erosion,
/// the erosion in the opposite case, and stays put on ties.
pub(crate) fn sharpen_step(samples: &mut [f64], dilated: &[f64], eroded: &[f64]) {
    for ((x, &d), &e) in samples.iter_mut().zip(dilated).zip(eroded) {
        let up = d - *x;
        let down = *x - e;
        if up < down {
            *x = d;
        } else if down < up {
            *x = e;
        }
    }
}
