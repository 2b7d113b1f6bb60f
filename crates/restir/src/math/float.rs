pub trait FloatAsExt: Sized {
    /// Returns `Some(f)` if `|f| > eps`, `None` otherwise.
    ///
    /// Returns None for NaN and Some(f) for +/- infty
    fn into_non_zero(self, eps: Self) -> Option<Self>;

    /// Returns `Some(f)` if f is finite.
    fn into_finite(self) -> Option<Self>;

    /// Maps NaN, infinities and negative values to zero.
    fn finite_non_negative_or_zero(self) -> Self;
}

macro_rules! impl_float_as_ext {
    ($($t:ty),*) => {$(
        impl FloatAsExt for $t {
            fn into_non_zero(self, eps: Self) -> Option<Self> {
                (self.abs() > eps).then_some(self)
            }

            fn into_finite(self) -> Option<Self> {
                self.is_finite().then_some(self)
            }

            fn finite_non_negative_or_zero(self) -> Self {
                if self.is_finite() && self > 0.0 {
                    self
                } else {
                    0.0
                }
            }
        }
    )*};
}

impl_float_as_ext!(f32, f64);

#[cfg(test)]
mod tests {
    use super::FloatAsExt;

    #[test]
    fn as_non_zero_test() {
        assert_eq!(0.0f32.into_non_zero(0.1), None);
        assert_eq!((-0.01f32).into_non_zero(0.1), None);
        assert_eq!((-1.0f32).into_non_zero(0.1), Some(-1.0));
        assert_eq!(f32::NAN.into_non_zero(0.1), None);
        assert_eq!(f64::INFINITY.into_non_zero(0.1), Some(f64::INFINITY));
    }

    #[test]
    fn weights_are_sanitized() {
        assert_eq!(2.5f64.finite_non_negative_or_zero(), 2.5);
        assert_eq!((-1.0f64).finite_non_negative_or_zero(), 0.0);
        assert_eq!(f64::NAN.finite_non_negative_or_zero(), 0.0);
        assert_eq!(f32::INFINITY.finite_non_negative_or_zero(), 0.0);
        assert_eq!(f32::INFINITY.into_finite(), None);
    }
}
