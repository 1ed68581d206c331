use crate::models::{PaymentState, RecurringPayment};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl RecurringPayment {
    fn step(&self) -> u32 {
        self.period.max(1)
    }

    /// Anchor moved forward by `count` billing periods
    ///
    /// Always computed from the anchor so short months never shift later
    /// billing days.
    fn occurrence(&self, count: u32) -> DateTime<Utc> {
        let date = count
            .checked_mul(self.step())
            .and_then(|months| self.active_on.checked_add_months(Months::new(months)))
            .unwrap_or(NaiveDate::MAX);
        midnight(date)
    }

    /// First billing instant at or after `after`
    pub fn next_payment(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let anchor = midnight(self.active_on);
        if after <= anchor {
            return anchor;
        }

        let elapsed_months = i64::from(after.year() - anchor.year()) * 12
            + i64::from(after.month())
            - i64::from(anchor.month());
        let estimate = u32::try_from(elapsed_months.max(0)).unwrap_or(u32::MAX) / self.step();

        let mut count = estimate.saturating_sub(1);
        loop {
            let candidate = self.occurrence(count);
            if candidate >= after || candidate == midnight(NaiveDate::MAX) {
                return candidate;
            }
            count = count.saturating_add(1);
        }
    }

    /// Last paid-through instant of a cancelled payment
    pub fn final_payment(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at.map(|cancelled| self.next_payment(cancelled))
    }

    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }

    /// True once `at` is past the final paid-through instant
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.final_payment().is_some_and(|last| at > last)
    }

    /// Mark cancelled; the tenant keeps access until the final payment
    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.cancelled_at = Some(at);
    }

    pub fn state(&self, at: DateTime<Utc>) -> PaymentState {
        if self.is_active() {
            PaymentState::Active
        } else if self.is_expired(at) {
            PaymentState::Expired
        } else {
            PaymentState::CancelledPendingExpiry
        }
    }
}
