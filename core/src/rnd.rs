//! Random source for probabilistic admission

/// Non-cryptographic uniform generator in `[0, 1)` used to decide whether a
/// call is shed while a breaker is degraded.
#[derive(Clone, Debug, Default)]
pub(crate) enum Rnd {
    #[default]
    Real,

    #[cfg(test)]
    Fixed(f64),
}

impl Rnd {
    pub fn next_f64(&self) -> f64 {
        match self {
            Self::Real => fastrand::f64(),
            #[cfg(test)]
            Self::Fixed(value) => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_rnd_in_unit_range() {
        let rnd = Rnd::Real;
        for _ in 0..1000 {
            let v = rnd.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_fixed_rnd() {
        let rnd = Rnd::Fixed(0.25);
        assert_eq!(rnd.next_f64(), 0.25);
        assert_eq!(format!("{rnd:?}"), "Fixed(0.25)");
    }
}
