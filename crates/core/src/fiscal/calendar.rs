//! The fiscal calendar: year and period lifecycle and the posting gate.

use chrono::{Datelike, Days, Months, NaiveDate};
use folio_shared::types::{FiscalYearId, PeriodId};

use super::period::{AccountingPeriod, FiscalYear, FiscalYearStatus, PeriodStatus};
use crate::ledger::LedgerError;

/// All fiscal years and their periods.
#[derive(Debug, Clone, Default)]
pub struct FiscalCalendar {
    years: Vec<FiscalYear>,
    periods: Vec<AccountingPeriod>,
}

impl FiscalCalendar {
    /// Creates an empty calendar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a calendar from stored rows.
    #[must_use]
    pub fn from_parts(years: Vec<FiscalYear>, mut periods: Vec<AccountingPeriod>) -> Self {
        periods.sort_by_key(|p| p.start_date);
        Self { years, periods }
    }

    /// Creates a fiscal year with monthly periods.
    ///
    /// # Errors
    ///
    /// - `InvalidDateRange` if `start >= end`
    /// - `OverlappingFiscalYear` if any existing year shares a day with it
    pub fn create_year(
        &mut self,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&FiscalYear, LedgerError> {
        if start >= end {
            return Err(LedgerError::InvalidDateRange { start, end });
        }
        if let Some(existing) = self
            .years
            .iter()
            .find(|y| start <= y.end_date && end >= y.start_date)
        {
            return Err(LedgerError::OverlappingFiscalYear(existing.name.clone()));
        }

        let year = FiscalYear {
            id: FiscalYearId::new(),
            name: name.into(),
            start_date: start,
            end_date: end,
            status: FiscalYearStatus::Open,
        };
        let periods = monthly_periods(year.id, start, end);
        self.periods.extend(periods);
        self.periods.sort_by_key(|p| p.start_date);
        self.years.push(year);
        Ok(&self.years[self.years.len() - 1])
    }

    /// Looks up a fiscal year.
    #[must_use]
    pub fn year(&self, id: FiscalYearId) -> Option<&FiscalYear> {
        self.years.iter().find(|y| y.id == id)
    }

    /// Looks up a fiscal year, failing with `FiscalYearNotFound`.
    pub fn require_year(&self, id: FiscalYearId) -> Result<&FiscalYear, LedgerError> {
        self.year(id).ok_or(LedgerError::FiscalYearNotFound(id))
    }

    /// Looks up a period.
    #[must_use]
    pub fn period(&self, id: PeriodId) -> Option<&AccountingPeriod> {
        self.periods.iter().find(|p| p.id == id)
    }

    /// Iterates over fiscal years in creation order.
    pub fn years(&self) -> impl Iterator<Item = &FiscalYear> {
        self.years.iter()
    }

    /// Iterates over all periods in date order.
    pub fn periods(&self) -> impl Iterator<Item = &AccountingPeriod> {
        self.periods.iter()
    }

    /// Iterates over the periods of one year in date order.
    pub fn periods_of(&self, year: FiscalYearId) -> impl Iterator<Item = &AccountingPeriod> {
        self.periods.iter().filter(move |p| p.fiscal_year_id == year)
    }

    /// Returns the fiscal year containing the date.
    #[must_use]
    pub fn year_for(&self, date: NaiveDate) -> Option<&FiscalYear> {
        self.years.iter().find(|y| y.contains_date(date))
    }

    /// Returns the period containing the date, failing with `NoOpenPeriod`.
    pub fn period_for(&self, date: NaiveDate) -> Result<&AccountingPeriod, LedgerError> {
        self.periods
            .iter()
            .find(|p| p.contains_date(date))
            .ok_or(LedgerError::NoOpenPeriod(date))
    }

    /// Checks that a posting may be dated on `date`.
    ///
    /// A closed year is reported before a locked period. Returns the year and
    /// period the posting belongs to.
    pub fn assert_postable(&self, date: NaiveDate) -> Result<(FiscalYearId, PeriodId), LedgerError> {
        let period = self.period_for(date)?;
        let year = self.require_year(period.fiscal_year_id)?;
        if year.is_closed() {
            return Err(LedgerError::FiscalYearClosed(year.name.clone()));
        }
        if !period.is_open() {
            return Err(LedgerError::PeriodLocked {
                date,
                period: period.name.clone(),
            });
        }
        Ok((year.id, period.id))
    }

    /// Posting gate for year-end entries.
    ///
    /// Like [`Self::assert_postable`], but a locked period is accepted.
    /// Closed periods and closed years still refuse the posting.
    pub fn assert_year_end_postable(
        &self,
        date: NaiveDate,
    ) -> Result<(FiscalYearId, PeriodId), LedgerError> {
        let period = self.period_for(date)?;
        let year = self.require_year(period.fiscal_year_id)?;
        if year.is_closed() {
            return Err(LedgerError::FiscalYearClosed(year.name.clone()));
        }
        if period.status == PeriodStatus::Closed {
            return Err(LedgerError::PeriodLocked {
                date,
                period: period.name.clone(),
            });
        }
        Ok((year.id, period.id))
    }

    /// Locks an open period.
    pub fn lock_period(&mut self, id: PeriodId) -> Result<&AccountingPeriod, LedgerError> {
        self.transition_period(id, PeriodStatus::Open, PeriodStatus::Locked)
    }

    /// Reopens a locked period.
    pub fn unlock_period(&mut self, id: PeriodId) -> Result<&AccountingPeriod, LedgerError> {
        self.transition_period(id, PeriodStatus::Locked, PeriodStatus::Open)
    }

    fn transition_period(
        &mut self,
        id: PeriodId,
        from: PeriodStatus,
        to: PeriodStatus,
    ) -> Result<&AccountingPeriod, LedgerError> {
        let period = self
            .periods
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LedgerError::PeriodNotFound(id))?;
        if period.status != from {
            return Err(LedgerError::InvalidStatusTransition {
                from: period.status.as_str(),
                to: to.as_str(),
            });
        }
        period.status = to;
        Ok(period)
    }

    /// Moves an open year to `Closing`.
    pub(crate) fn begin_close(&mut self, id: FiscalYearId) -> Result<(), LedgerError> {
        let year = self
            .years
            .iter_mut()
            .find(|y| y.id == id)
            .ok_or(LedgerError::FiscalYearNotFound(id))?;
        if year.status != FiscalYearStatus::Open {
            return Err(LedgerError::InvalidStatusTransition {
                from: year.status.as_str(),
                to: FiscalYearStatus::Closing.as_str(),
            });
        }
        year.status = FiscalYearStatus::Closing;
        Ok(())
    }

    /// Closes every period of a closing year and the year itself.
    ///
    /// Returns the periods whose status changed.
    pub(crate) fn finish_close(&mut self, id: FiscalYearId) -> Result<Vec<PeriodId>, LedgerError> {
        let year = self
            .years
            .iter_mut()
            .find(|y| y.id == id)
            .ok_or(LedgerError::FiscalYearNotFound(id))?;
        if year.status != FiscalYearStatus::Closing {
            return Err(LedgerError::InvalidStatusTransition {
                from: year.status.as_str(),
                to: FiscalYearStatus::Closed.as_str(),
            });
        }
        year.status = FiscalYearStatus::Closed;

        let mut closed = Vec::new();
        for period in self.periods.iter_mut().filter(|p| p.fiscal_year_id == id) {
            if period.status != PeriodStatus::Closed {
                period.status = PeriodStatus::Closed;
                closed.push(period.id);
            }
        }
        Ok(closed)
    }

    /// Returns the year starting the day after `id` ends, creating it with the
    /// same number of monthly periods when missing.
    ///
    /// The flag is true when the year was created.
    pub(crate) fn ensure_next_year(
        &mut self,
        id: FiscalYearId,
    ) -> Result<(FiscalYearId, bool), LedgerError> {
        let year = self.require_year(id)?;
        let start = year
            .end_date
            .checked_add_days(Days::new(1))
            .ok_or(LedgerError::InvalidDateRange {
                start: year.start_date,
                end: year.end_date,
            })?;
        if let Some(next) = self.years.iter().find(|y| y.start_date == start) {
            return Ok((next.id, false));
        }

        let months = u32::try_from(self.periods_of(id).count()).unwrap_or(12).max(1);
        let end = start
            .checked_add_months(Months::new(months))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .ok_or(LedgerError::InvalidDateRange { start, end: start })?;
        let next = self.create_year(format!("FY{}", start.year()), start, end)?;
        Ok((next.id, true))
    }
}

fn monthly_periods(year: FiscalYearId, start: NaiveDate, end: NaiveDate) -> Vec<AccountingPeriod> {
    let mut periods = Vec::new();
    let mut period_start = start;
    let mut number = 1;
    while period_start <= end {
        let period_end = period_start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .map_or(end, |d| d.min(end));
        periods.push(AccountingPeriod {
            id: PeriodId::new(),
            fiscal_year_id: year,
            period_number: number,
            name: period_start.format("%B %Y").to_string(),
            start_date: period_start,
            end_date: period_end,
            status: PeriodStatus::Open,
        });
        number += 1;
        match period_end.checked_add_days(Days::new(1)) {
            Some(next) => period_start = next,
            None => break,
        }
    }
    periods
}
