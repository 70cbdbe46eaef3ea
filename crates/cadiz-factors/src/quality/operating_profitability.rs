//! Operating profitability quality factor.

use cadiz_traits::{Factor, Security};

/// Operating profitability quality factor.
///
/// Computes `(operating_income - interest_expense) / total_equity`, the
/// profitability measure of the Fama-French five-factor model.
///
/// The value is missing when any input is missing or total equity is zero.
///
/// # Example
///
/// ```
/// use cadiz_factors::quality::OperatingProfitability;
/// use cadiz_traits::{Factor, Security};
///
/// let mut security = Security::new("MSFT");
/// security.operating_income = Some(12.0);
/// security.interest_expense = Some(2.0);
/// security.total_equity = Some(40.0);
/// assert_eq!(OperatingProfitability.compute(&security), Some(0.25));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatingProfitability;

impl Factor for OperatingProfitability {
    fn name(&self) -> &str {
        "operating_profitability"
    }

    fn compute(&self, security: &Security) -> Option<f64> {
        let operating_income = security.operating_income?;
        let interest_expense = security.interest_expense?;
        let equity = security.total_equity?;

        if equity == 0.0 {
            return None;
        }

        Some((operating_income - interest_expense) / equity).filter(|v| v.is_finite())
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_fields(&self) -> &[&str] {
        &["operating_income", "interest_expense", "total_equity"]
    }
}
