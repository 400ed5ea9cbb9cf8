use std::fmt::Debug;

use num_traits::Float;

/// A trait for floating-point types that can be used as point coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Distances
/// and queue priorities are expressed in the same scalar type as the
/// coordinates, so everything stays in one numeric domain.
pub trait Scalar: private::Sealed + Float + Debug + Send + Sync + 'static {}

impl Scalar for f32 {}
impl Scalar for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
