//! Line-item vocabulary shared by the statement documents.
//!
//! Each item lists the provider field names it may appear under, primary name
//! first. Alpha Vantage names come before the FMP-style names used by
//! peer documents.

/// A named line item of a balance sheet, income statement or cash-flow statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineItem {
  // Income statement
  TotalRevenue,
  CostOfRevenue,
  OperatingExpenses,
  OperatingIncome,
  Ebit,
  Ebitda,
  DepreciationAndAmortization,
  InterestExpense,
  IncomeBeforeTax,
  IncomeTaxExpense,
  NetIncome,

  // Cash flow
  OperatingCashflow,
  CapitalExpenditures,
  CashFlowDepreciation,

  // Balance sheet
  TotalAssets,
  TotalLiabilities,
  TotalShareholderEquity,
  TotalCurrentAssets,
  TotalCurrentLiabilities,
  CashAndEquivalents,
  CurrentNetReceivables,
  Inventory,
  OtherCurrentAssets,
  CurrentAccountsPayable,
  OtherCurrentLiabilities,
  ShortTermDebt,
  LongTermDebt,
  CurrentDebt,
  SharesOutstanding,
}

impl LineItem {
  /// Field names this item may appear under, in lookup order.
  pub fn aliases(&self) -> &'static [&'static str] {
    match self {
      LineItem::TotalRevenue => &["totalRevenue", "revenue"],
      LineItem::CostOfRevenue => &["costOfRevenue", "costofGoodsAndServicesSold"],
      LineItem::OperatingExpenses => &["operatingExpenses"],
      LineItem::OperatingIncome => &["operatingIncome"],
      LineItem::Ebit => &["ebit", "operatingIncome"],
      LineItem::Ebitda => &["ebitda"],
      LineItem::DepreciationAndAmortization => &["depreciationAndAmortization"],
      LineItem::InterestExpense => &["interestExpense"],
      LineItem::IncomeBeforeTax => &["incomeBeforeTax"],
      LineItem::IncomeTaxExpense => &["incomeTaxExpense"],
      LineItem::NetIncome => &["netIncome"],

      LineItem::OperatingCashflow => &["operatingCashflow", "operatingCashFlow"],
      LineItem::CapitalExpenditures => &["capitalExpenditures", "capitalExpenditure"],
      LineItem::CashFlowDepreciation => {
        &["depreciationDepletionAndAmortization", "depreciationAndAmortization"]
      }

      LineItem::TotalAssets => &["totalAssets"],
      LineItem::TotalLiabilities => &["totalLiabilities"],
      LineItem::TotalShareholderEquity => &["totalShareholderEquity", "totalStockholdersEquity"],
      LineItem::TotalCurrentAssets => &["totalCurrentAssets"],
      LineItem::TotalCurrentLiabilities => &["totalCurrentLiabilities"],
      LineItem::CashAndEquivalents => {
        &["cashAndCashEquivalentsAtCarryingValue", "cashAndCashEquivalents"]
      }
      LineItem::CurrentNetReceivables => &["currentNetReceivables", "netReceivables"],
      LineItem::Inventory => &["inventory"],
      LineItem::OtherCurrentAssets => &["otherCurrentAssets"],
      LineItem::CurrentAccountsPayable => &["currentAccountsPayable", "accountPayables"],
      LineItem::OtherCurrentLiabilities => &["otherCurrentLiabilities"],
      LineItem::ShortTermDebt => &["shortTermDebt"],
      LineItem::LongTermDebt => &["longTermDebt"],
      LineItem::CurrentDebt => &["currentDebt"],
      LineItem::SharesOutstanding => &["commonStockSharesOutstanding"],
    }
  }

  /// Primary provider field name
  pub fn field_name(&self) -> &'static str {
    self.aliases()[0]
  }
}

impl std::fmt::Display for LineItem {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.field_name())
  }
}
