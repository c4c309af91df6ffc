//! Close-price series for a single symbol.

use chrono::NaiveDate;
use serde::Serialize;

/// One observation: closing price on a trading date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An ordered sequence of (date, price) observations.
///
/// Dates are strictly increasing. The series is never mutated by the
/// simulation; the driver only reads prefixes of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from observations, sorting by date.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Most recent price in the series.
    pub fn latest_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }

    /// Price recorded exactly on `date`, if any.
    pub fn price_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].price)
    }

    /// The prefix of the series with dates on or before `date`.
    ///
    /// Returns an empty series when no observation qualifies. This is the
    /// "as of" view the backtest driver feeds to the filter and the signal
    /// generator at each step.
    pub fn up_to(&self, date: NaiveDate) -> PriceSeries {
        let end = self.points.partition_point(|p| p.date <= date);
        PriceSeries {
            points: self.points[..end].to_vec(),
        }
    }

    /// Period-over-period percentage returns, skipping non-finite values.
    pub fn returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| (w[1].price - w[0].price) / w[0].price)
            .filter(|r| r.is_finite())
            .collect()
    }
}
