use super::types::ProjectionRow;

pub const MAX_PROJECTION_YEARS: u32 = 120;

/// Year-by-year ledger. Contributions land at the start of each year and earn
/// that year's return. Row 0 is today's balance with no discounting.
pub fn project(
    start_age: u32,
    num_years: u32,
    principal: f64,
    annual_contribution: f64,
    nominal_return: f64,
    inflation: f64,
) -> Vec<ProjectionRow> {
    project_indexed(
        start_age,
        num_years,
        principal,
        annual_contribution,
        0.0,
        nominal_return,
        inflation,
    )
}

/// Same ledger with the contribution raised by `contribution_growth` every
/// year after the first. Indexing it to inflation keeps the contribution
/// constant in today's money.
pub fn project_indexed(
    start_age: u32,
    num_years: u32,
    principal: f64,
    annual_contribution: f64,
    contribution_growth: f64,
    nominal_return: f64,
    inflation: f64,
) -> Vec<ProjectionRow> {
    let num_years = num_years.min(MAX_PROJECTION_YEARS);
    let mut rows = Vec::with_capacity(num_years as usize + 1);
    rows.push(ProjectionRow {
        year_index: 0,
        age: start_age,
        balance_start: principal,
        contribution: 0.0,
        interest: 0.0,
        balance_end_nominal: principal,
        balance_end_real: principal,
    });

    let mut balance = principal;
    let mut contribution = annual_contribution;
    for year in 1..=num_years {
        if year > 1 && contribution_growth != 0.0 {
            contribution *= 1.0 + contribution_growth;
        }
        let start = balance;
        let interest = (start + contribution) * nominal_return;
        balance = start + contribution + interest;
        let discount = if inflation == 0.0 {
            1.0
        } else {
            (1.0 + inflation).powi(year as i32)
        };

        rows.push(ProjectionRow {
            year_index: year,
            age: start_age.saturating_add(year),
            balance_start: start,
            contribution,
            interest,
            balance_end_nominal: balance,
            balance_end_real: balance / discount,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn first_row_is_undiscounted_principal() {
        let rows = project(30, 0, 20_000.0, 36_000.0, 0.057, 0.03);
        assert_eq!(rows.len(), 1);
        let row = rows[0];
        assert_eq!(row.year_index, 0);
        assert_eq!(row.age, 30);
        assert_approx(row.balance_start, 20_000.0);
        assert_approx(row.contribution, 0.0);
        assert_approx(row.interest, 0.0);
        assert_approx(row.balance_end_nominal, 20_000.0);
        assert_approx(row.balance_end_real, 20_000.0);
    }

    #[test]
    fn compound_path_matches_hand_calculation() {
        // ((100 + 10) * 1.1 + 10) * 1.1 = 144.1
        let rows = project(40, 2, 100.0, 10.0, 0.10, 0.0);
        assert_eq!(rows.len(), 3);
        assert_approx(rows[1].interest, 11.0);
        assert_approx(rows[1].balance_end_nominal, 121.0);
        assert_approx(rows[2].balance_start, 121.0);
        assert_approx(rows[2].interest, 13.1);
        assert_approx(rows[2].balance_end_nominal, 144.1);
        assert_approx(rows[2].balance_end_real, 144.1);
        assert_eq!(rows[2].age, 42);
    }

    #[test]
    fn real_balance_is_discounted_by_cumulative_inflation() {
        let rows = project(30, 3, 1_000.0, 0.0, 0.0, 0.02);
        assert_approx(rows[3].balance_end_nominal, 1_000.0);
        assert_approx(rows[3].balance_end_real, 1_000.0 / 1.02_f64.powi(3));
    }

    #[test]
    fn indexed_contribution_stays_flat_in_real_terms() {
        let rows = project_indexed(30, 3, 0.0, 1_000.0, 0.02, 0.0, 0.02);
        assert_approx(rows[1].contribution, 1_000.0);
        assert_approx(rows[2].contribution, 1_020.0);
        assert_approx(rows[3].contribution, 1_040.4);
        // Zero nominal return: the real balance is three years of 1000 in
        // start-of-year money, each discounted one year further.
        assert_approx(rows[3].balance_end_nominal, 3_060.4);
        assert_approx(rows[3].balance_end_real, 3_060.4 / 1.02_f64.powi(3));
    }

    #[test]
    fn zero_growth_matches_flat_projection() {
        let flat = project(30, 10, 5_000.0, 1_200.0, 0.05, 0.02);
        let indexed = project_indexed(30, 10, 5_000.0, 1_200.0, 0.0, 0.05, 0.02);
        assert_eq!(flat, indexed);
    }

    #[test]
    fn age_saturates_instead_of_overflowing() {
        let rows = project(u32::MAX - 1, 3, 100.0, 0.0, 0.0, 0.0);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].age, u32::MAX);
        assert_eq!(rows[3].age, u32::MAX);
    }

    #[test]
    fn horizon_is_capped() {
        let rows = project(20, 500, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(rows.len(), MAX_PROJECTION_YEARS as usize + 1);
    }

    proptest! {
        #[test]
        fn rows_chain_from_previous_year(
            principal in 0.0f64..1_000_000.0,
            contribution in 0.0f64..100_000.0,
            nominal in -0.5f64..0.5,
            inflation in 0.0f64..0.2,
            years in 0u32..80,
        ) {
            let rows = project(25, years, principal, contribution, nominal, inflation);
            prop_assert_eq!(rows.len(), years as usize + 1);
            prop_assert!(rows[0].balance_end_real == rows[0].balance_start);
            for pair in rows.windows(2) {
                prop_assert!(pair[1].balance_start == pair[0].balance_end_nominal);
                prop_assert_eq!(pair[1].year_index, pair[0].year_index + 1);
                prop_assert_eq!(pair[1].age, pair[0].age + 1);
            }
        }
    }
}
