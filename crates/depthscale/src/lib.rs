#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use depthscale_3d as k3d;

#[doc(inline)]
pub use depthscale_calib as calib;

#[doc(inline)]
pub use depthscale_imgproc as imgproc;
