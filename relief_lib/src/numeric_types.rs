use std::fmt::Debug;

use nalgebra::RealField;
use num_traits::{FromPrimitive, ToPrimitive};

/// Convenience trait marking types that can be shared between threads
pub trait ThreadSafe: Sync + Send + 'static {}
impl<T> ThreadSafe for T where T: Sync + Send + 'static {}

/// Trait for the scalar type used in all floating point computations of this crate
pub trait Real: RealField + Copy + FromPrimitive + ToPrimitive + Debug + ThreadSafe {
    /// Tries to convert this value to another [Real] type, returns None if conversion fails
    fn try_convert<T: Real>(self) -> Option<T> {
        T::from_f64(self.to_f64()?)
    }

    /// Converts this value to f64, panics if the value cannot be represented
    fn to_f64_unchecked(self) -> f64 {
        self.to_f64().unwrap()
    }

    /// Converts an f64 value to this type, panics if the value cannot be represented
    fn from_f64_unchecked(value: f64) -> Self {
        Self::from_f64(value).unwrap()
    }
}

impl<T: RealField + Copy + FromPrimitive + ToPrimitive + Debug + ThreadSafe> Real for T {}
