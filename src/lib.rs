//! Axial rotary position embeddings for tch.
//!
//! Rotates adjacent pairs of per-head features by angles derived from a token's `(x, y)` position and
//! learned per-head, per-frequency log-scales, so attention scores depend on relative 2-D offsets.
//!
//! ```no_run
//! use axial_rope_tch::{pixel_positions, AxialRoPE, AxialRoPEConfig};
//! use tch::{nn, Device, Kind, Tensor};
//!
//! let varstore = nn::VarStore::new(Device::Cpu);
//! let config = AxialRoPEConfig::new(16, 2).with_highest_frequency(100.0);
//! let rope = AxialRoPE::new(&varstore.root(), config)?;
//!
//! let x = Tensor::randn([1, 2, 64, 16], (Kind::Float, Device::Cpu)); // (B, H, L, E)
//! let position = pixel_positions(8, 8, (Kind::Float, Device::Cpu)).unsqueeze(0); // (B, L, 2)
//! let x = rope.forward(&x, &position)?; // (B, H, L, E)
//! # Ok::<(), axial_rope_tch::Error>(())
//! ```

mod axial;
mod error;
mod position;
mod rotation;

pub use axial::{initial_log_frequencies, AxialRoPE, AxialRoPEConfig};
pub use error::{Error, Result};
pub use position::{index_positions, pixel_positions};
pub use rotation::{rotate, rotate_from, rotate_half};

#[doc(hidden)]
pub use ndarray;

#[macro_export]
macro_rules! tensor {
    ($($x:tt)*) => {
        {
            ::tch::Tensor::try_from($crate::ndarray::array![$($x)*]).unwrap()
        }
    };
}
