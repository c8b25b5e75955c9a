//! Fixtures shared by the unit tests.

use chrono::NaiveDate;
use folio_shared::LedgerConfig;

use super::state::LedgerState;
use crate::chart::STANDARD_CHART;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Standard chart plus an open FY2026, with no pending changes.
pub(crate) fn standard_ledger() -> LedgerState {
    let mut state = LedgerState::new(LedgerConfig::default());
    for account in STANDARD_CHART {
        state.create_account(account.to_new_account()).unwrap();
    }
    state
        .create_fiscal_year("FY2026", date(2026, 1, 1), date(2026, 12, 31))
        .unwrap();
    state.take_changes();
    state
}
