/// Standard annuity installment for a principal amortized monthly.
///
/// `installment = P * r(1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate. A
/// zero rate degenerates to straight division.
pub fn installment(principal: f64, annual_rate: f64, months: u32) -> f64 {
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / months as f64;
    }
    let growth = (1.0 + r).powi(months as i32);
    principal * r * growth / (growth - 1.0)
}

/// Largest principal whose amortized installment equals the given payment
/// (the annuity present-value formula).
pub fn max_principal(payment: f64, annual_rate: f64, months: u32) -> f64 {
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return payment * months as f64;
    }
    let growth = (1.0 + r).powi(months as i32);
    payment * (growth - 1.0) / (r * growth)
}
