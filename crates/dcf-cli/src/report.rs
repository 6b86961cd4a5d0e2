//! Plain-text calculation log written next to the valuation document.

use dcf_engine::historical::{HistoricalSeries, SeriesUnit};
use dcf_engine::rounding::{round_decimal, CURRENCY_DP, PER_SHARE_DP, RATE_DP};
use dcf_engine::ValuationResult;
use std::fmt;

pub struct CalculationLog<'a>(pub &'a ValuationResult);

fn num(value: Option<f64>, dp: u32) -> String {
  value.and_then(|v| round_decimal(v, dp)).map_or_else(|| "n/a".to_string(), |d| d.to_string())
}

fn money(value: f64) -> String {
  num(Some(value), CURRENCY_DP)
}

fn rate(value: f64) -> String {
  num(Some(value), RATE_DP)
}

fn series(f: &mut fmt::Formatter<'_>, label: &str, series: &HistoricalSeries) -> fmt::Result {
  let dp = match series.unit {
    SeriesUnit::Currency => CURRENCY_DP,
    SeriesUnit::Rate => RATE_DP,
  };
  let values: Vec<String> = series
    .points
    .iter()
    .map(|p| {
      let year = p.fiscal_year.map_or_else(|| "?".to_string(), |y| y.to_string());
      format!("{year}: {}", num(p.value, dp))
    })
    .collect();
  writeln!(f, "  {label:<32} {}", values.join(", "))
}

impl fmt::Display for CalculationLog<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let r = self.0;
    let a = &r.assumptions;

    writeln!(
      f,
      "DCF calculation data for {} ({})",
      r.ticker.as_deref().unwrap_or("unknown"),
      r.company_name.as_deref().unwrap_or("unnamed")
    )?;
    writeln!(
      f,
      "Latest period: {} (fiscal year {})",
      r.latest_period_end.as_deref().unwrap_or("n/a"),
      num(r.latest_fiscal_year.map(f64::from), 0)
    )?;

    writeln!(f, "\n== Assumptions ==")?;
    writeln!(f, "  WACC                             {}", rate(a.discount_rate))?;
    writeln!(f, "  Terminal growth                  {}", rate(a.terminal_growth_rate))?;
    writeln!(f, "  FCF growth                       {}", rate(a.fcf_growth_rate))?;
    writeln!(f, "  Forecast horizon (years)         {}", a.forecast_horizon)?;

    writeln!(f, "\n== Historical (newest first) ==")?;
    let h = &r.historical;
    series(f, "Net revenue", &h.net_revenue)?;
    series(f, "Cost of revenue", &h.cost_of_revenue)?;
    series(f, "Operating expenses", &h.operating_expenses)?;
    series(f, "Depreciation & amortization", &h.depreciation_and_amortization)?;
    series(f, "Capital expenditures", &h.capital_expenditures)?;
    series(f, "EBIT", &h.ebit)?;
    series(f, "EBITDA", &h.ebitda)?;
    series(f, "Operating working capital", &h.operating_working_capital)?;
    series(f, "Change in OWC", &h.change_in_owc)?;
    series(f, "Revenue growth", &h.revenue_growth)?;
    writeln!(f, "  {:<32} {}", "Revenue CAGR", num(h.revenue_cagr, RATE_DP))?;

    writeln!(f, "\n== Capital inputs ==")?;
    let c = &r.capital;
    writeln!(f, "  {:<32} {} ({:?})", "Corporate tax rate", num(c.tax_rate, RATE_DP), c.tax_rate_source)?;
    writeln!(f, "  {:<32} {}", "Cost of debt", num(c.cost_of_debt, RATE_DP))?;
    writeln!(f, "  {:<32} {}", "After-tax cost of debt", num(c.after_tax_cost_of_debt, RATE_DP))?;
    writeln!(
      f,
      "  {:<32} {} (market cap {})",
      "Size premium",
      rate(c.size_premium.premium),
      num(c.size_premium.market_cap, CURRENCY_DP)
    )?;

    writeln!(f, "\n== Free cash flow forecast ==")?;
    writeln!(f, "  Starting FCF: {} ({:?})", money(r.starting_fcf), r.starting_fcf_source)?;
    for year in &r.forecast {
      writeln!(
        f,
        "  Year {} ({}): FCF {}, discount factor {}, present value {}",
        year.year,
        num(year.fiscal_year.map(f64::from), 0),
        money(year.fcf),
        rate(year.discount_factor),
        money(year.discounted_fcf)
      )?;
    }
    writeln!(f, "  {:<32} {}", "Sum of discounted FCF", money(r.sum_discounted_fcf))?;
    writeln!(f, "  {:<32} {}", "Terminal value", money(r.terminal_value))?;
    writeln!(f, "  {:<32} {}", "Discounted terminal value", money(r.discounted_terminal_value))?;

    writeln!(f, "\n== Valuation ==")?;
    writeln!(f, "  {:<32} {}", "Enterprise value", money(r.enterprise_value))?;
    writeln!(f, "  {:<32} {}", "Total debt", money(r.total_debt))?;
    writeln!(f, "  {:<32} {}", "Cash", money(r.cash))?;
    writeln!(f, "  {:<32} {}", "Equity value", money(r.equity_value))?;
    writeln!(f, "  {:<32} {}", "Shares outstanding", money(r.shares_outstanding))?;
    writeln!(
      f,
      "  {:<32} {}",
      "Intrinsic value per share",
      num(r.intrinsic_value_per_share, PER_SHARE_DP)
    )?;

    writeln!(f, "\n== Peers ({} supplied, {} used) ==", r.peers.supplied, r.peers.peers.len())?;
    for peer in &r.peers.peers {
      writeln!(
        f,
        "  {:<8} market cap {}, EV {}, EBITDA {}, sales {}",
        peer.ticker,
        num(peer.market_cap, CURRENCY_DP),
        num(peer.enterprise_value, CURRENCY_DP),
        num(peer.ebitda, CURRENCY_DP),
        num(peer.sales, CURRENCY_DP)
      )?;
    }
    let m = &r.peers.multiples;
    writeln!(f, "  {:<32} {}", "Median EV/EBITDA", num(m.ev_to_ebitda, RATE_DP))?;
    writeln!(f, "  {:<32} {}", "Median EV/Sales", num(m.ev_to_sales, RATE_DP))?;
    writeln!(f, "  {:<32} {}", "Median P/E", num(m.price_to_earnings, RATE_DP))?;
    writeln!(f, "  {:<32} {}", "Average peer tax rate", num(r.peers.average_tax_rate, RATE_DP))?;

    if !r.diagnostics.is_empty() {
      writeln!(f, "\n== Diagnostics ==")?;
      for d in &r.diagnostics {
        writeln!(f, "  {}: {}", d.field, d.reason)?;
      }
    }
    Ok(())
  }
}
