//! Price history port trait.

use crate::domain::error::BullBearError;
use crate::domain::price_bar::PriceBar;

pub trait DataPort {
    /// All bars for `instrument`, ascending by timestamp.
    fn fetch_bars(&self, instrument: &str) -> Result<Vec<PriceBar>, BullBearError>;

    /// Instruments this source can serve, sorted.
    fn list_instruments(&self) -> Result<Vec<String>, BullBearError>;
}
