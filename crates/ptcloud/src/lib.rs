#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use ptcloud_3d as cloud;

#[doc(inline)]
pub use ptcloud_index as index;
