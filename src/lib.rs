//! NTT convolution and formal power series over Montgomery-reduced mints

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]

extern crate rand;

pub mod mint;
pub mod dynamic;
pub mod factorize;
pub mod primitive_root;
pub mod ntt;
pub mod garner;
pub mod fps;

pub use dynamic::{DynMint, DynMontgomery, ModulusError};
pub use factorize::{factorize, is_prime};
pub use fps::{ArbitraryFps, Convolution, Fps, NttFps};
pub use garner::{ArbitraryConvolution, ConvolutionU64};
pub use mint::{Mint, Mint32, Mint64, Mod32, Mod64, Modulus, Word};
pub use ntt::NttConvolution;
