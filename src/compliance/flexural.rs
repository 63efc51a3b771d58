//! Flexural strength (modulus of rupture) from a three-point breaking test

/// Support span as a fraction of the tile length
pub const SPAN_RATIO: f64 = 0.9;

/// Compute flexural strength in N/mm²
///
/// `strength = 3 F l / (2 b h²)` with span `l = 0.9 × length`. Every input
/// must be present and strictly positive; otherwise the calculation does not
/// apply and `None` is returned.
pub fn flexural_strength(
    force: Option<f64>,
    length: Option<f64>,
    width: Option<f64>,
    thickness: Option<f64>,
) -> Option<f64> {
    let force = positive(force)?;
    let length = positive(length)?;
    let width = positive(width)?;
    let thickness = positive(thickness)?;

    let span = SPAN_RATIO * length;
    Some((3.0 * force * span) / (2.0 * width * thickness * thickness))
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_reference_sample() {
        let s = flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(10.0)).unwrap();
        assert!(approx(s, 27.0), "got {}", s);
    }

    #[test]
    fn test_doubling_force_doubles_strength() {
        let base = flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(10.0)).unwrap();
        let doubled = flexural_strength(Some(2000.0), Some(300.0), Some(150.0), Some(10.0)).unwrap();
        assert!(approx(doubled, 2.0 * base));
    }

    #[test]
    fn test_halving_thickness_quadruples_strength() {
        let base = flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(10.0)).unwrap();
        let thin = flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(5.0)).unwrap();
        assert!(approx(thin, 4.0 * base));
    }

    #[test]
    fn test_missing_or_zero_dimension_is_not_applicable() {
        assert!(flexural_strength(None, Some(300.0), Some(150.0), Some(10.0)).is_none());
        assert!(flexural_strength(Some(1000.0), None, Some(150.0), Some(10.0)).is_none());
        assert!(flexural_strength(Some(1000.0), Some(300.0), Some(0.0), Some(10.0)).is_none());
        assert!(flexural_strength(Some(1000.0), Some(300.0), Some(150.0), Some(-1.0)).is_none());
    }
}
