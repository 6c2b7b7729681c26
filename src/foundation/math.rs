pub(crate) const EPSILON: f64 = 1e-9;

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let rem = a % b;
        a = b;
        b = rem;
    }
    a
}

/// Least common multiple, `None` on overflow. A zero operand is ignored.
pub(crate) fn lcm_u64(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(a.max(b));
    }
    (a / gcd_u64(a, b)).checked_mul(b)
}

/// Smallest positive integer that every period divides, `None` on overflow.
pub(crate) fn lcm_all(periods: impl IntoIterator<Item = u64>) -> Option<u64> {
    periods.into_iter().try_fold(1u64, lcm_u64)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
