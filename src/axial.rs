use einops::einops;
use log::debug;
use std::f64::consts::PI;
use tch::{nn, Device, Kind, Tensor};

use crate::error::{Error, Result};
use crate::rotation::rotate;

/// construction parameters for [`AxialRoPE`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxialRoPEConfig {
    /// embedding dimension per head, a positive multiple of 4
    pub embedding_dimension: i64,
    pub heads: i64,
    /// initial frequencies span `π` to `highest_frequency * π / 2`
    pub highest_frequency: f64,
}

impl AxialRoPEConfig {
    pub fn new(embedding_dimension: i64, heads: i64) -> AxialRoPEConfig {
        AxialRoPEConfig {
            embedding_dimension,
            heads,
            highest_frequency: 10.0,
        }
    }

    pub fn with_highest_frequency(mut self, highest_frequency: f64) -> AxialRoPEConfig {
        self.highest_frequency = highest_frequency;
        self
    }

    /// number of learned frequencies per axis and head
    pub fn frequencies_per_axis(&self) -> i64 {
        self.embedding_dimension / 4
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_dimension < 4 || self.embedding_dimension % 4 != 0 {
            return Err(Error::invalid_configuration(
                "embedding_dimension",
                format!("must be a positive multiple of 4, got {}", self.embedding_dimension),
            ));
        }

        if self.heads < 1 {
            return Err(Error::invalid_configuration("heads", format!("must be positive, got {}", self.heads)));
        }

        if !(self.highest_frequency.is_finite() && self.highest_frequency > 0.0) {
            return Err(Error::invalid_configuration(
                "highest_frequency",
                format!("must be positive and finite, got {}", self.highest_frequency),
            ));
        }

        Ok(())
    }
}

/// The shared starting point of both axes: `embedding_dimension / 4` values evenly spaced from `ln(π)` to
/// `ln(highest_frequency * π / 2)`, identical for every head. Shape: (heads, embedding_dimension / 4).
pub fn initial_log_frequencies(config: &AxialRoPEConfig, device: Device) -> Result<Tensor> {
    config.validate()?;

    let frequencies = Tensor::f_linspace(
        PI.ln(),
        (config.highest_frequency * PI / 2.0).ln(),
        config.frequencies_per_axis(),
        (Kind::Double, device),
    )?;

    Ok(frequencies.f_expand([config.heads, -1], false)?)
}

/// Axial rotary position embedding over 2-D token positions.
///
/// Holds two trainable log-frequency tensors of shape (heads, embedding_dimension / 4), one per spatial
/// axis. Both start from [`initial_log_frequencies`] but are separate variables of the owning
/// [`nn::VarStore`], so an optimizer updates them independently.
#[derive(Debug)]
pub struct AxialRoPE {
    config: AxialRoPEConfig,
    x_frequencies: Tensor,
    y_frequencies: Tensor,
}

impl AxialRoPE {
    /// Registers `x_frequencies` and `y_frequencies` under `path`.
    pub fn new(path: &nn::Path, config: AxialRoPEConfig) -> Result<AxialRoPE> {
        let frequencies = initial_log_frequencies(&config, path.device())?;

        // var_copy allocates a fresh buffer for each axis
        let x_frequencies = path.var_copy("x_frequencies", &frequencies);
        let y_frequencies = path.var_copy("y_frequencies", &frequencies);

        debug!(
            "axial rope: embedding_dimension={}, heads={}, highest_frequency={}, frequencies {:?}",
            config.embedding_dimension,
            config.heads,
            config.highest_frequency,
            x_frequencies.size()
        );

        Ok(AxialRoPE {
            config,
            x_frequencies,
            y_frequencies,
        })
    }

    pub fn config(&self) -> &AxialRoPEConfig {
        &self.config
    }

    /// learned log-frequencies of the x axis (position component 0)
    pub fn x_frequencies(&self) -> &Tensor {
        &self.x_frequencies
    }

    /// learned log-frequencies of the y axis (position component 1)
    pub fn y_frequencies(&self) -> &Tensor {
        &self.y_frequencies
    }

    /// Rotation angles for `position` of shape (..., L, 2), returned with shape (..., heads, L, E).
    ///
    /// Along the last axis the y angles come first and the x angles second, and every angle is repeated
    /// for the two features of the pair it rotates.
    pub fn frequencies(&self, position: &Tensor) -> Result<Tensor> {
        let size = position.size();

        if size.len() < 2 || size.last() != Some(&2) {
            return Err(Error::shape_mismatch("position", "(..., L, 2)", size));
        }

        let x_frequencies = Self::axis_angles(position, 0, &self.x_frequencies)?;
        let y_frequencies = Self::axis_angles(position, 1, &self.y_frequencies)?;

        let frequencies = Tensor::f_cat(&[y_frequencies, x_frequencies], -1)?;
        let frequencies = einops!(".. n -> .. (n repeat:2)", &frequencies);

        Ok(frequencies.f_transpose(-2, -3)?)
    }

    // (..., L, 2) -> (..., L, heads, E / 4)
    fn axis_angles(position: &Tensor, axis: i64, log_frequencies: &Tensor) -> Result<Tensor> {
        let coordinate = position.f_select(-1, axis)?.f_unsqueeze(-1)?.f_unsqueeze(-1)?;
        Ok(coordinate.f_mul(&log_frequencies.f_exp()?)?)
    }

    fn check_heads(&self, name: &'static str, x: &Tensor) -> Result<()> {
        let size = x.size();

        if size.len() < 3 || size[size.len() - 3] != self.config.heads {
            return Err(Error::shape_mismatch(
                name,
                format!("(..., {}, L, {})", self.config.heads, self.config.embedding_dimension),
                size,
            ));
        }

        Ok(())
    }

    /// Rotates `x` of shape (B, H, L, E) by the angles of `position` of shape (B, L, 2).
    ///
    /// Features past the rotated width are passed through unchanged.
    pub fn forward(&self, x: &Tensor, position: &Tensor) -> Result<Tensor> {
        self.check_heads("x", x)?;

        let frequencies = self.frequencies(position)?;
        debug!("axial rope forward: x {:?}, position {:?}, frequencies {:?}", x.size(), position.size(), frequencies.size());

        rotate(x, &frequencies)
    }

    /// Rotates queries and keys that share `position`, deriving the angles once.
    pub fn rotate_queries_and_keys(&self, q: &Tensor, k: &Tensor, position: &Tensor) -> Result<(Tensor, Tensor)> {
        self.check_heads("q", q)?;
        self.check_heads("k", k)?;

        let frequencies = self.frequencies(position)?;

        Ok((rotate(q, &frequencies)?, rotate(k, &frequencies)?))
    }
}
