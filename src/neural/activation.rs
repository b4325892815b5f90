//! Activation used by hidden layers.

/// Cheap sigmoid-shaped squashing `v / (1 + |v|)`.
///
/// Saturates towards ±1 without an exponential. Not interchangeable with
/// `tanh` or the logistic function.
#[inline]
pub fn fast_sigmoid(v: f64) -> f64 {
    v / (1.0 + v.abs())
}
