//! Point-in-time assembly of a [`CycleContext`] from tabular data.
//!
//! Fundamentals and prices arrive as long-format Polars frames keyed by
//! `symbol` and `date`. Only rows dated on or before the decision date are
//! used, so a snapshot never sees data published after `as_of`.

use std::collections::BTreeMap;

use polars::prelude::*;

use crate::{CadizError, CycleContext, Date, Result, Security};

/// Columns required in the fundamentals frame.
pub const FUNDAMENTAL_COLUMNS: &[&str] = &[
    "symbol",
    "date",
    "exchange",
    "sector",
    "market_cap",
    "total_equity",
    "operating_income",
    "interest_expense",
    "tradable",
];

/// Columns required in the prices frame.
pub const PRICE_COLUMNS: &[&str] = &["symbol", "date", "close"];

impl CycleContext {
    /// Builds a cycle snapshot from fundamentals and price frames.
    ///
    /// For each symbol the most recent fundamentals row dated on or before
    /// `as_of` supplies the attributes, and the last `window` closes dated on
    /// or before `as_of` form the price history (oldest first). Symbols that
    /// appear only in the prices frame are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing, a column has an
    /// unexpected type, or the resulting snapshot contains no securities.
    pub fn from_frames(
        as_of: Date,
        fundamentals: &DataFrame,
        prices: &DataFrame,
        window: usize,
    ) -> Result<Self> {
        require_columns(fundamentals, FUNDAMENTAL_COLUMNS)?;
        require_columns(prices, PRICE_COLUMNS)?;

        let mut securities = latest_fundamentals(fundamentals, as_of)?;
        if securities.is_empty() {
            return Err(CadizError::InvalidData(format!(
                "No fundamentals available up to date {as_of}"
            )));
        }

        for (symbol, closes) in close_histories(prices, as_of, window)? {
            if let Some(security) = securities.get_mut(&symbol) {
                security.closes = closes;
            }
        }

        Self::new(as_of, securities.into_values().collect())
    }
}

fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    for col in columns {
        if df.column(col).is_err() {
            return Err(CadizError::MissingColumn((*col).to_string()));
        }
    }
    Ok(())
}

/// Keeps rows dated on or before `as_of`, sorted by symbol then date.
///
/// The sort is stable, so among rows sharing a symbol and date the one
/// appearing last in the input is treated as the latest.
fn point_in_time(df: &DataFrame, as_of: Date) -> Result<DataFrame> {
    let mask = df
        .column("date")?
        .as_materialized_series()
        .date()?
        .as_date_iter()
        .map(|d| d.is_some_and(|d| d <= as_of))
        .collect::<BooleanChunked>();

    let filtered = df.filter(&mask)?;
    Ok(filtered.sort(
        ["symbol", "date"],
        SortMultipleOptions::default().with_maintain_order(true),
    )?)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}

fn latest_fundamentals(df: &DataFrame, as_of: Date) -> Result<BTreeMap<String, Security>> {
    let sorted = point_in_time(df, as_of)?;

    let symbols = sorted
        .column("symbol")?
        .as_materialized_series()
        .str()?
        .clone();
    let exchanges = sorted
        .column("exchange")?
        .as_materialized_series()
        .str()?
        .clone();
    let sectors = sorted
        .column("sector")?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let sectors = sectors.i32()?;
    let tradable = sorted
        .column("tradable")?
        .as_materialized_series()
        .bool()?
        .clone();
    let market_cap = float_column(&sorted, "market_cap")?;
    let total_equity = float_column(&sorted, "total_equity")?;
    let operating_income = float_column(&sorted, "operating_income")?;
    let interest_expense = float_column(&sorted, "interest_expense")?;

    // Rows are date-ascending within each symbol, so later rows overwrite
    // earlier ones and the most recent snapshot wins.
    let mut securities = BTreeMap::new();
    for i in 0..sorted.height() {
        let Some(symbol) = symbols.get(i) else {
            continue;
        };
        let security = Security {
            id: symbol.to_string(),
            exchange: exchanges.get(i).map(str::to_string),
            sector: sectors.get(i),
            market_cap: market_cap.get(i),
            total_equity: total_equity.get(i),
            operating_income: operating_income.get(i),
            interest_expense: interest_expense.get(i),
            tradable: tradable.get(i).unwrap_or(false),
            closes: Vec::new(),
        };
        securities.insert(security.id.clone(), security);
    }

    Ok(securities)
}

fn close_histories(
    df: &DataFrame,
    as_of: Date,
    window: usize,
) -> Result<BTreeMap<String, Vec<Option<f64>>>> {
    let sorted = point_in_time(df, as_of)?;

    let symbols = sorted
        .column("symbol")?
        .as_materialized_series()
        .str()?
        .clone();
    let closes = float_column(&sorted, "close")?;

    let mut histories: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for i in 0..sorted.height() {
        let Some(symbol) = symbols.get(i) else {
            continue;
        };
        histories
            .entry(symbol.to_string())
            .or_default()
            .push(closes.get(i));
    }

    for history in histories.values_mut() {
        if history.len() > window {
            history.drain(..history.len() - window);
        }
    }

    Ok(histories)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn fundamentals() -> DataFrame {
        df! {
            "symbol" => &["A", "A", "B"],
            "date" => &[d(1), d(10), d(2)],
            "exchange" => &["NYS", "NYS", "NAS"],
            "sector" => &[101, 102, 205],
            "market_cap" => &[Some(10.0), Some(12.0), None],
            "total_equity" => &[5.0, 6.0, 3.0],
            "operating_income" => &[1.0, 1.5, 0.5],
            "interest_expense" => &[0.1, 0.2, 0.0],
            "tradable" => &[true, true, false],
        }
        .unwrap()
    }

    fn prices() -> DataFrame {
        df! {
            "symbol" => &["A", "A", "A", "A", "B", "B"],
            "date" => &[d(1), d(2), d(3), d(6), d(1), d(2)],
            "close" => &[Some(1.0), Some(2.0), None, Some(9.0), Some(5.0), Some(6.0)],
        }
        .unwrap()
    }

    #[test]
    fn test_from_frames_point_in_time() {
        let ctx = CycleContext::from_frames(d(5), &fundamentals(), &prices(), 10).unwrap();
        assert_eq!(ctx.as_of, d(5));
        assert_eq!(ctx.len(), 2);

        let a = ctx.security("A").unwrap();
        // The 2024-01-10 fundamentals row is after as_of and must be ignored.
        assert_eq!(a.market_cap, Some(10.0));
        assert_eq!(a.sector, Some(101));
        assert_eq!(a.exchange.as_deref(), Some("NYS"));
        assert!(a.tradable);
        // The 2024-01-06 close is after as_of as well.
        assert_eq!(a.closes, vec![Some(1.0), Some(2.0), None]);

        let b = ctx.security("B").unwrap();
        assert_eq!(b.market_cap, None);
        assert!(!b.tradable);
        assert_eq!(b.closes, vec![Some(5.0), Some(6.0)]);
    }

    #[test]
    fn test_from_frames_latest_row_wins() {
        let ctx = CycleContext::from_frames(d(20), &fundamentals(), &prices(), 10).unwrap();
        let a = ctx.security("A").unwrap();
        assert_eq!(a.market_cap, Some(12.0));
        assert_eq!(a.sector, Some(102));
        assert_eq!(a.closes.len(), 4);
    }

    #[test]
    fn test_from_frames_same_day_rows_keep_input_order() {
        let fundamentals = df! {
            "symbol" => &["B", "A", "A", "A"],
            "date" => &[d(1), d(3), d(3), d(2)],
            "exchange" => &["NYS", "NYS", "NAS", "NYS"],
            "sector" => &[101, 101, 102, 103],
            "market_cap" => &[1.0, 10.0, 20.0, 30.0],
            "total_equity" => &[1.0, 1.0, 1.0, 1.0],
            "operating_income" => &[1.0, 1.0, 1.0, 1.0],
            "interest_expense" => &[0.0, 0.0, 0.0, 0.0],
            "tradable" => &[true, true, true, true],
        }
        .unwrap();

        for _ in 0..5 {
            let ctx = CycleContext::from_frames(d(5), &fundamentals, &prices(), 10).unwrap();
            let a = ctx.security("A").unwrap();
            assert_eq!(a.market_cap, Some(20.0));
            assert_eq!(a.exchange.as_deref(), Some("NAS"));
            assert_eq!(a.sector, Some(102));
        }
    }

    #[test]
    fn test_from_frames_window_truncates_oldest() {
        let ctx = CycleContext::from_frames(d(20), &fundamentals(), &prices(), 2).unwrap();
        let a = ctx.security("A").unwrap();
        assert_eq!(a.closes, vec![None, Some(9.0)]);
    }

    #[test]
    fn test_from_frames_missing_column() {
        let prices = df! {
            "symbol" => &["A"],
            "date" => &[d(1)],
        }
        .unwrap();
        let result = CycleContext::from_frames(d(5), &fundamentals(), &prices, 10);
        assert!(matches!(result, Err(CadizError::MissingColumn(c)) if c == "close"));
    }

    #[test]
    fn test_from_frames_nothing_before_as_of() {
        let result = CycleContext::from_frames(
            Date::from_ymd_opt(2023, 12, 31).unwrap(),
            &fundamentals(),
            &prices(),
            10,
        );
        assert!(matches!(result, Err(CadizError::InvalidData(_))));
    }
}
