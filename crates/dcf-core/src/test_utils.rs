/// Default tolerance for floating-point comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Assert that two floating-point numbers are approximately equal
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
  assert!(
    (actual - expected).abs() < tolerance,
    "Values not approximately equal:\n  actual:   {}\n  expected: {}\n  diff:     {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs(),
    tolerance
  );
}

/// Assert that two rates (growth, discount, tax) agree to 1e-9
pub fn assert_rate_eq(actual: f64, expected: f64) {
  assert_approx_eq(actual, expected, DEFAULT_TOLERANCE);
}

/// Assert that two currency amounts agree relative to their magnitude
pub fn assert_currency_eq(actual: f64, expected: f64) {
  let tolerance = DEFAULT_TOLERANCE * expected.abs().max(1.0);
  assert_approx_eq(actual, expected, tolerance);
}

/// Assert that an optional figure is present and approximately equal
pub fn assert_some_approx(actual: Option<f64>, expected: f64) {
  match actual {
    Some(value) => assert_currency_eq(value, expected),
    None => panic!("Expected Some({}), got None", expected),
  }
}
