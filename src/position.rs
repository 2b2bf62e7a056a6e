use tch::{Device, Kind, Tensor};

// (x, y) pairs of a row-major height x width grid, shape (height * width, 2)
fn grid(ys: Tensor, xs: Tensor) -> Tensor {
    let (height, width) = (ys.size()[0], xs.size()[0]);

    let ys = ys.view([height, 1]).expand([height, width], false);
    let xs = xs.view([1, width]).expand([height, width], false);

    Tensor::stack(&[xs, ys], -1).reshape([height * width, 2])
}

/// Patch positions of a `height` x `width` image normalized to `[-1, 1]` along each axis.
///
/// Rows are enumerated first, so token `i` sits at column `i % width` and row `i / width`. Add a leading
/// batch dimension before passing the result to [`crate::AxialRoPE::forward`].
pub fn pixel_positions(height: i64, width: i64, options: (Kind, Device)) -> Tensor {
    grid(
        Tensor::linspace(-1.0, 1.0, height, options),
        Tensor::linspace(-1.0, 1.0, width, options),
    )
}

/// Integer patch coordinates `(column, row)` of a `height` x `width` image, in the same order as
/// [`pixel_positions`].
pub fn index_positions(height: i64, width: i64, options: (Kind, Device)) -> Tensor {
    grid(Tensor::arange(height, options), Tensor::arange(width, options))
}
