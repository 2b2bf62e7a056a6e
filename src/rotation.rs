use einops::einops;
use tch::Tensor;

use crate::error::{Error, Result};

/// Rotates every adjacent pair `(a, b)` of the last dimension by 90 degrees, producing `(-b, a)`.
pub fn rotate_half(x: &Tensor) -> Result<Tensor> {
    let size = x.size();
    let width = size.last().copied().unwrap_or(0);

    if width % 2 != 0 {
        return Err(Error::shape_mismatch("x", "an even sized last dimension", size));
    }

    let even = x.f_slice(-1, 0, width, 2)?;
    let odd = x.f_slice(-1, 1, width, 2)?;
    let pairs = Tensor::f_stack(&[odd.f_neg()?, even], -1)?;

    Ok(einops!(".. d r -> .. (d r)", &pairs))
}

/// Rotates the leading `frequencies.size(-1)` features of `x` by `frequencies`, passing the rest through.
pub fn rotate(x: &Tensor, frequencies: &Tensor) -> Result<Tensor> {
    rotate_from(x, frequencies, 0)
}

/// Like [`rotate`], but the rotated window starts at `start_index` instead of at the first feature.
///
/// Features before the window and after it are concatenated back unchanged, so the output always has
/// the shape of `x`.
pub fn rotate_from(x: &Tensor, frequencies: &Tensor, start_index: i64) -> Result<Tensor> {
    let x_size = x.size();
    let frequencies_size = frequencies.size();

    let (Some(&features), Some(&rotated)) = (x_size.last(), frequencies_size.last()) else {
        return Err(Error::shape_mismatch("frequencies", "at least one dimension", frequencies_size));
    };

    if start_index < 0 || start_index + rotated > features {
        return Err(Error::shape_mismatch(
            "x",
            format!("a last dimension of at least {} to rotate features {}..{}", start_index + rotated, start_index, start_index + rotated),
            x_size,
        ));
    }

    let end_index = start_index + rotated;

    let x_left = x.f_narrow(-1, 0, start_index)?;
    let x_middle = x.f_narrow(-1, start_index, rotated)?;
    let x_right = x.f_narrow(-1, end_index, features - end_index)?;

    let middle_rotated = rotate_half(&x_middle)?;
    let x_middle = x_middle
        .f_mul(&frequencies.f_cos()?)?
        .f_add(&middle_rotated.f_mul(&frequencies.f_sin()?)?)?;

    Ok(Tensor::f_cat(&[x_left, x_middle, x_right], -1)?)
}
