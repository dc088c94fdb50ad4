// pf-core/src/units.rs

use uom::si::f64::ThermodynamicTemperature as UomThermodynamicTemperature;
use uom::si::thermodynamic_temperature::kelvin;

use crate::{PfError, Real};

pub type Temperature = UomThermodynamicTemperature;

/// Molar gas constant, J/(mol K).
pub const GAS_CONSTANT: Real = 8.314_462_618;

#[inline]
pub fn k(v: f64) -> Temperature {
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kelvin_value(t: Temperature) -> Real {
    t.get::<kelvin>()
}

/// R*T in J/mol.
pub fn rt(t: Temperature) -> Result<Real, PfError> {
    let tk = kelvin_value(t);
    if !(tk.is_finite() && tk > 0.0) {
        return Err(PfError::InvalidArg {
            what: "temperature must be finite and positive",
        });
    }
    Ok(GAS_CONSTANT * tk)
}

/// 1/(R*T) in mol/J, the scale the equilibrium solvers are set up with.
pub fn rt_inverse(t: Temperature) -> Result<Real, PfError> {
    rt(t).map(|v| 1.0 / v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rt_at_900k() {
        let v = rt(k(900.0)).unwrap();
        assert!((v - 7483.016_356_2).abs() < 1e-6);
        let inv = rt_inverse(k(900.0)).unwrap();
        assert!((inv * v - 1.0).abs() < 1e-15);
    }

    #[test]
    fn rejects_non_positive_temperature() {
        assert!(rt(k(0.0)).is_err());
        assert!(rt(k(-10.0)).is_err());
        assert!(rt_inverse(k(f64::NAN)).is_err());
    }
}
