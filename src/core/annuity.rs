const DEGENERATE_SPREAD: f64 = 1e-9;

/// Value at the retirement date of `years` payments that start at `payment`
/// and grow with inflation, discounted at `nominal_return`.
pub fn present_value_growing_annuity(
    payment: f64,
    nominal_return: f64,
    inflation_growth: f64,
    years: f64,
) -> f64 {
    if years <= 0.0 {
        return 0.0;
    }
    if (nominal_return - inflation_growth).abs() < DEGENERATE_SPREAD {
        return payment * years;
    }

    let ratio = (1.0 + inflation_growth) / (1.0 + nominal_return);
    payment * (1.0 - ratio.powf(years)) / (nominal_return - inflation_growth)
}

/// Infinite-horizon price of a real withdrawal stream; unbounded when real
/// growth is not positive.
pub fn perpetual_real_value(withdrawal_today: f64, real_rate: f64) -> f64 {
    if real_rate <= 0.0 {
        return f64::INFINITY;
    }
    withdrawal_today / real_rate
}

/// Discount factor that moves a growing stream `years` forward.
pub(crate) fn growth_discount(nominal_return: f64, inflation_growth: f64, years: f64) -> f64 {
    ((1.0 + inflation_growth) / (1.0 + nominal_return)).powf(years)
}
