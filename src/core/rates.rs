#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AssetWeights {
    pub stocks: f64,
    pub fixed: f64,
    pub cash: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AssetRates {
    pub stocks: f64,
    pub fixed: f64,
    pub cash: f64,
}

/// Which of the two candidate values drives an asset's rate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RateKind {
    None,
    Custom,
    Preset,
}

pub fn resolve_rate(kind: RateKind, custom: f64, preset: f64) -> f64 {
    match kind {
        RateKind::None => 0.0,
        RateKind::Custom => custom,
        RateKind::Preset => preset,
    }
}

/// Weighted average of the per-asset rates. Weights are clamped to `[0, 1]`
/// and renormalised; all-zero weights yield a 0% rate.
pub fn blended_nominal_rate(weights: AssetWeights, rates: AssetRates) -> f64 {
    let stocks = weights.stocks.clamp(0.0, 1.0);
    let fixed = weights.fixed.clamp(0.0, 1.0);
    let cash = weights.cash.clamp(0.0, 1.0);
    let sum = stocks + fixed + cash;
    if sum <= 0.0 {
        return 0.0;
    }

    (stocks * rates.stocks + fixed * rates.fixed + cash * rates.cash) / sum
}

/// Fisher relation. Zero inflation returns `nominal` unchanged.
pub fn real_return_from_nominal(nominal: f64, inflation: f64) -> f64 {
    if inflation == 0.0 {
        return nominal;
    }
    (1.0 + nominal) / (1.0 + inflation) - 1.0
}

/// Three-way stocks/fixed/cash split in percent. Cash is never stored; it is
/// whatever the other two leave of 100.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Allocation {
    stocks_pct: f64,
    fixed_pct: f64,
}

impl Allocation {
    pub fn new(stocks_pct: f64, fixed_pct: f64) -> Self {
        let stocks_pct = clamp_pct(stocks_pct);
        let fixed_pct = clamp_pct(fixed_pct).min(100.0 - stocks_pct);
        Self {
            stocks_pct,
            fixed_pct,
        }
    }

    pub fn stocks_pct(&self) -> f64 {
        self.stocks_pct
    }

    pub fn fixed_pct(&self) -> f64 {
        self.fixed_pct
    }

    pub fn cash_pct(&self) -> f64 {
        clamp_pct(100.0 - self.stocks_pct - self.fixed_pct)
    }

    pub fn weights(&self) -> AssetWeights {
        AssetWeights {
            stocks: self.stocks_pct / 100.0,
            fixed: self.fixed_pct / 100.0,
            cash: self.cash_pct() / 100.0,
        }
    }

    pub fn blended_rate(&self, rates: AssetRates) -> f64 {
        blended_nominal_rate(self.weights(), rates)
    }

    /// Raising stocks takes from fixed first, then cash. Lowering stocks
    /// frees room into cash.
    pub fn set_stocks(&mut self, value: f64) {
        let value = clamp_pct(value);
        let delta = value - self.stocks_pct;
        if delta > 0.0 {
            let from_fixed = delta.min(self.fixed_pct);
            self.fixed_pct -= from_fixed;
        }
        self.stocks_pct = value;
        self.fixed_pct = self.fixed_pct.min(100.0 - self.stocks_pct).max(0.0);
    }

    /// Raising fixed takes from cash first, then stocks. Lowering fixed
    /// frees room into cash.
    pub fn set_fixed(&mut self, value: f64) {
        let value = clamp_pct(value);
        let delta = value - self.fixed_pct;
        if delta > 0.0 {
            let from_cash = delta.min(self.cash_pct());
            let from_stocks = (delta - from_cash).min(self.stocks_pct);
            self.stocks_pct -= from_stocks;
        }
        self.fixed_pct = value;
        self.stocks_pct = self.stocks_pct.min(100.0 - self.fixed_pct).max(0.0);
    }

    /// Raising cash takes from stocks first, then fixed. Lowering cash hands
    /// the freed room to stocks.
    pub fn set_cash(&mut self, value: f64) {
        let value = clamp_pct(value);
        let delta = value - self.cash_pct();
        if delta > 0.0 {
            let from_stocks = delta.min(self.stocks_pct);
            let from_fixed = (delta - from_stocks).min(self.fixed_pct);
            self.stocks_pct -= from_stocks;
            self.fixed_pct -= from_fixed;
        } else if delta < 0.0 {
            self.stocks_pct = (self.stocks_pct - delta).min(100.0 - self.fixed_pct);
        }
    }
}

impl Default for Allocation {
    fn default() -> Self {
        Self::new(70.0, 20.0)
    }
}

fn clamp_pct(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
