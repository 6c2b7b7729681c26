use super::*;

#[test]
fn gcd_and_lcm_basics() {
    assert_eq!(gcd_u64(300, 500), 100);
    assert_eq!(gcd_u64(7, 0), 7);
    assert_eq!(lcm_u64(300, 500), Some(1500));
    assert_eq!(lcm_u64(0, 40), Some(40));
}

#[test]
fn lcm_all_combines_and_detects_overflow() {
    assert_eq!(lcm_all([300, 500]), Some(1500));
    assert_eq!(lcm_all([4, 6, 10]), Some(60));
    assert_eq!(lcm_all(std::iter::empty()), Some(1));
    assert_eq!(lcm_all([u64::MAX, u64::MAX - 1]), None);
}

#[test]
fn approx_eq_tolerates_rounding_noise() {
    assert!(approx_eq(0.1 + 0.2, 0.3));
    assert!(!approx_eq(0.3, 0.31));
    assert_eq!(lerp(2.0, 4.0, 0.25), 2.5);
}
