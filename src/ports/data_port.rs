//! Data access port trait.

use crate::domain::error::DiptraderError;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, DiptraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, DiptraderError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DiptraderError>;
}
