use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;

#[cfg(feature = "ndarray")]
pub type MainBackend = burn::backend::NdArray<f32, i64>;
#[cfg(all(feature = "wgpu", not(feature = "ndarray")))]
pub type MainBackend = burn::backend::Wgpu<f32, i32>;
#[cfg(all(feature = "tch-cpu", not(any(feature = "ndarray", feature = "wgpu"))))]
pub type MainBackend = burn::backend::LibTorch<f32, i64>;

/// Device used by the training binary.
pub trait MainDevice: Backend {
    fn main_device() -> <Self as Backend>::Device {
        Default::default()
    }
}

#[cfg(feature = "_has-backend")]
impl MainDevice for MainBackend {}

pub type MainAutoBackend = burn::backend::Autodiff<MainBackend>;
impl MainDevice for MainAutoBackend {
    fn main_device() -> <Self as Backend>::Device {
        <<Self as AutodiffBackend>::InnerBackend as MainDevice>::main_device()
    }
}

#[cfg(not(feature = "_has-backend"))]
mod err {
    use super::*;
    std::compile_error!(
        "No backend selected. Enable one of the `ndarray`, `wgpu` or `tch-cpu` features."
    );

    // pretend to fallback to ndarray (to avoid too many other unrelated errors)
    pub type MainBackend = burn::backend::NdArray<f32, i64>;
    impl MainDevice for MainBackend {}
}
#[cfg(not(feature = "_has-backend"))]
pub use err::*;
