//! Point-vector source abstractions for the hdbstar core runtime.
//!
//! The engine never owns coordinates. It borrows each row from a
//! [`VectorSource`] once, validates it, and reads it through
//! [`crate::Distances`] for the rest of the run.

use core::fmt;

use crate::error::VectorSourceError;

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Fixed-width floating-point coordinate type accepted by the engine.
///
/// Implemented for `f32` and `f64` only. Both precisions widen exactly to
/// `f64`, so every distance is accumulated in double precision regardless of
/// the storage type.
///
/// # Examples
/// ```
/// use hdbstar_core::Coordinate;
///
/// assert_eq!(1.5_f32.to_f64(), 1.5);
/// assert!(!f64::NAN.is_finite_value());
/// assert_eq!(<f32 as Coordinate>::PRECISION, "f32");
/// ```
pub trait Coordinate: Copy + fmt::Debug + Send + Sync + sealed::Sealed + 'static {
    /// Short name of the storage precision, used in diagnostics.
    const PRECISION: &'static str;

    /// Widens the coordinate to `f64` without rounding.
    fn to_f64(self) -> f64;

    /// Returns `true` when the coordinate is neither NaN nor infinite.
    fn is_finite_value(self) -> bool;
}

impl Coordinate for f32 {
    const PRECISION: &'static str = "f32";

    #[rustfmt::skip]
    fn to_f64(self) -> f64 { f64::from(self) }

    #[rustfmt::skip]
    fn is_finite_value(self) -> bool { self.is_finite() }
}

impl Coordinate for f64 {
    const PRECISION: &'static str = "f64";

    #[rustfmt::skip]
    fn to_f64(self) -> f64 { self }

    #[rustfmt::skip]
    fn is_finite_value(self) -> bool { self.is_finite() }
}

/// A collection of points embedded in a fixed-dimension numeric space.
///
/// # Examples
/// ```
/// use hdbstar_core::{VectorSource, VectorSourceError};
///
/// struct Rows(Vec<[f64; 2]>);
///
/// impl VectorSource for Rows {
///     type Coordinate = f64;
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "rows" }
///     fn dimension(&self) -> usize { 2 }
///     fn vector(&self, index: usize) -> Result<&[f64], VectorSourceError> {
///         self.0
///             .get(index)
///             .map(|row| row.as_slice())
///             .ok_or(VectorSourceError::OutOfBounds { index })
///     }
/// }
///
/// let rows = Rows(vec![[0.0, 1.0], [2.0, 3.0]]);
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows.vector(1)?, &[2.0, 3.0]);
/// assert!(rows.vector(2).is_err());
/// # Ok::<(), VectorSourceError>(())
/// ```
pub trait VectorSource: Sync {
    /// Storage precision of the coordinates.
    type Coordinate: Coordinate;

    /// Returns number of points in the source.
    fn len(&self) -> usize;

    /// Returns whether the source contains no points.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns the dimensionality shared by every row.
    fn dimension(&self) -> usize;

    /// Borrows the coordinates of the point at `index`.
    ///
    /// # Errors
    /// Implementations must return [`VectorSourceError::OutOfBounds`] for
    /// indices `>= len()`.
    fn vector(&self, index: usize) -> Result<&[Self::Coordinate], VectorSourceError>;
}
