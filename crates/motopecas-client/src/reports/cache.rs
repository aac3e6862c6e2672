use chrono::NaiveDate;

use crate::ledger::LedgerSnapshot;
use crate::reports::dashboard::Dashboard;
use crate::reports::date::MonthKey;

/// Memoizes the last [`Dashboard`] by `(snapshot version, reference month)`.
///
/// Snapshots from different ledgers may share a version number; use one
/// cache per ledger.
#[derive(Debug, Default)]
pub struct ReportCache {
    entry: Option<CachedDashboard>,
    hits: u64,
    misses: u64,
}

#[derive(Debug)]
struct CachedDashboard {
    version: u64,
    month: MonthKey,
    dashboard: Dashboard,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, snapshot: &LedgerSnapshot, reference_date: NaiveDate) -> &Dashboard {
        let month = MonthKey::of(reference_date);
        let fresh = self
            .entry
            .as_ref()
            .is_some_and(|entry| entry.version == snapshot.version && entry.month == month);

        if fresh {
            self.hits += 1;
        } else {
            self.misses += 1;
            self.entry = None;
            tracing::debug!(version = snapshot.version, month = %month, "report cache miss");
        }

        let entry = self.entry.get_or_insert_with(|| CachedDashboard {
            version: snapshot.version,
            month,
            dashboard: Dashboard::build(snapshot, reference_date),
        });
        &entry.dashboard
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub const fn hits(&self) -> u64 {
        self.hits
    }

    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::ReportCache;
    use crate::ledger::{LedgerChange, LedgerRepository, MemoryLedger, NewTransaction, TransactionKind};

    fn income(day: u32, amount: i64) -> LedgerChange {
        LedgerChange::AddTransaction(NewTransaction {
            date: NaiveDate::from_ymd_opt(2023, 10, day).unwrap_or(NaiveDate::MIN),
            description: "Revisão".to_string(),
            amount: Decimal::new(amount, 0),
            kind: TransactionKind::Income,
            category: Some("Serviços".to_string()),
            payment: None,
        })
    }

    #[test]
    fn recomputes_only_when_version_or_month_changes() {
        let mut ledger = MemoryLedger::new();
        let mut cache = ReportCache::new();
        let october = NaiveDate::from_ymd_opt(2023, 10, 15).unwrap_or(NaiveDate::MIN);
        let late_october = NaiveDate::from_ymd_opt(2023, 10, 30).unwrap_or(NaiveDate::MIN);
        let november = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap_or(NaiveDate::MIN);

        assert!(ledger.commit(income(1, 450)).is_ok());
        let first = ledger.snapshot();
        assert!(first.is_ok());
        let Ok(first) = first else {
            return;
        };

        let income_total = cache.get_or_build(&first, october).stats.total_income;
        assert_eq!(income_total, Decimal::new(450, 0));
        let _ = cache.get_or_build(&first, late_october);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        let _ = cache.get_or_build(&first, november);
        assert_eq!((cache.hits(), cache.misses()), (1, 2));

        assert!(ledger.commit(income(2, 50)).is_ok());
        let second = ledger.snapshot();
        assert!(second.is_ok());
        let Ok(second) = second else {
            return;
        };
        let income_total = cache.get_or_build(&second, november).stats.total_income;
        assert_eq!(income_total, Decimal::new(500, 0));
        assert_eq!((cache.hits(), cache.misses()), (1, 3));

        cache.invalidate();
        let _ = cache.get_or_build(&second, november);
        assert_eq!(cache.misses(), 4);
    }
}
