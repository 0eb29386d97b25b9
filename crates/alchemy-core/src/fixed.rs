use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Milliseconds on the host's monotonically increasing elapsed-time clock.
pub type Millis = u64;

/// Convert an f64 to Fixed64. Use only at the host boundary, never in the
/// per-tick path.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert an f64 to Fixed64, saturating at the type's range. NaN becomes
/// zero.
#[inline]
pub fn f64_to_fixed64_saturating(v: f64) -> Fixed64 {
    if v.is_nan() {
        Fixed64::ZERO
    } else {
        Fixed64::saturating_from_num(v)
    }
}

/// Convert Fixed64 to f64. Use only for display and host callbacks.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// `part / whole` clamped to `[0, 1]`. A zero `whole` yields zero.
#[inline]
pub fn ratio_clamped(part: u32, whole: u32) -> Fixed64 {
    if whole == 0 {
        return Fixed64::ZERO;
    }
    let r = Fixed64::from_num(part) / Fixed64::from_num(whole);
    r.clamp(Fixed64::ZERO, Fixed64::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_conversion_never_panics() {
        assert_eq!(f64_to_fixed64_saturating(1e10), Fixed64::MAX);
        assert_eq!(f64_to_fixed64_saturating(f64::NEG_INFINITY), Fixed64::MIN);
        assert_eq!(f64_to_fixed64_saturating(f64::NAN), Fixed64::ZERO);
        assert_eq!(f64_to_fixed64_saturating(1.5), f64_to_fixed64(1.5));
    }

    #[test]
    fn fixed64_round_trips_temperature() {
        let t = f64_to_fixed64(212.5);
        assert_eq!(fixed64_to_f64(t), 212.5);
    }

    #[test]
    fn ratio_clamped_bounds() {
        assert_eq!(ratio_clamped(150, 300), f64_to_fixed64(0.5));
        assert_eq!(ratio_clamped(400, 300), Fixed64::ONE);
        assert_eq!(ratio_clamped(0, 300), Fixed64::ZERO);
    }

    #[test]
    fn ratio_with_zero_whole_is_zero() {
        assert_eq!(ratio_clamped(10, 0), Fixed64::ZERO);
    }
}
