use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use thiserror::Error;

use storefront_core::{
    AggregateRoot, DomainError, Entity, ExpectedVersion, MerchantId, SettlementId,
};
use storefront_settlement::{NOTES_MAX_CHARS, Settlement, SettlementRecord, SettlementStatus};

/// Errors raised by settlement storage.
#[derive(Debug, Error)]
pub enum SettlementStoreError {
    /// A settlement already exists for this merchant and day.
    #[error("settlement already recorded for merchant {merchant_id} on {settlement_date}")]
    Duplicate {
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
    },

    /// Notes do not fit the notes column.
    #[error("settlement {id} notes have {chars} characters (max {max})")]
    NotesTooLong {
        id: SettlementId,
        chars: usize,
        max: usize,
    },

    #[error("settlement {0} not found")]
    NotFound(SettlementId),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A stored row could not be turned back into a settlement.
    #[error("stored settlement is invalid: {0}")]
    Corrupt(#[from] DomainError),

    #[error("settlement store lock poisoned")]
    Poisoned,
}

/// Persistence port for settlements.
///
/// Implementations must enforce one settlement per (merchant, date) and serve
/// the lookups covered by the date and status indexes.
pub trait SettlementStore: Send + Sync {
    fn insert(&self, settlement: &Settlement) -> Result<(), SettlementStoreError>;

    /// Overwrite a stored settlement, checking the stored version first.
    fn update(
        &self,
        settlement: &Settlement,
        expected_version: ExpectedVersion,
    ) -> Result<(), SettlementStoreError>;

    fn get(&self, id: SettlementId) -> Result<Option<Settlement>, SettlementStoreError>;

    fn find_by_merchant_and_date(
        &self,
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
    ) -> Result<Option<Settlement>, SettlementStoreError>;

    fn list_by_date(
        &self,
        settlement_date: NaiveDate,
    ) -> Result<Vec<Settlement>, SettlementStoreError>;

    fn list_by_status(
        &self,
        status: SettlementStatus,
    ) -> Result<Vec<Settlement>, SettlementStoreError>;
}

impl<S> SettlementStore for Arc<S>
where
    S: SettlementStore + ?Sized,
{
    fn insert(&self, settlement: &Settlement) -> Result<(), SettlementStoreError> {
        (**self).insert(settlement)
    }

    fn update(
        &self,
        settlement: &Settlement,
        expected_version: ExpectedVersion,
    ) -> Result<(), SettlementStoreError> {
        (**self).update(settlement, expected_version)
    }

    fn get(&self, id: SettlementId) -> Result<Option<Settlement>, SettlementStoreError> {
        (**self).get(id)
    }

    fn find_by_merchant_and_date(
        &self,
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
    ) -> Result<Option<Settlement>, SettlementStoreError> {
        (**self).find_by_merchant_and_date(merchant_id, settlement_date)
    }

    fn list_by_date(
        &self,
        settlement_date: NaiveDate,
    ) -> Result<Vec<Settlement>, SettlementStoreError> {
        (**self).list_by_date(settlement_date)
    }

    fn list_by_status(
        &self,
        status: SettlementStatus,
    ) -> Result<Vec<Settlement>, SettlementStoreError> {
        (**self).list_by_status(status)
    }
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<SettlementId, SettlementRecord>,
    // Unique index: (merchant_id, settlement_date) -> id.
    by_merchant_date: HashMap<(i64, NaiveDate), SettlementId>,
}

/// In-memory settlement store for tests/dev.
///
/// Rows are kept in their flattened [`SettlementRecord`] form and restored on
/// every read, like a database-backed store would.
#[derive(Debug, Default)]
pub struct InMemorySettlementStore {
    tables: RwLock<Tables>,
}

impl InMemorySettlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_notes_fit(settlement: &Settlement) -> Result<(), SettlementStoreError> {
        if settlement.notes_fit_column() {
            return Ok(());
        }
        let chars = settlement.notes().chars().count();
        tracing::warn!(settlement_id = %settlement.id(), chars, "settlement notes too long");
        Err(SettlementStoreError::NotesTooLong {
            id: *settlement.id(),
            chars,
            max: NOTES_MAX_CHARS,
        })
    }

    fn restore_all<'a>(
        rows: impl Iterator<Item = &'a SettlementRecord>,
    ) -> Result<Vec<Settlement>, SettlementStoreError> {
        let mut records: Vec<&SettlementRecord> = rows.collect();
        records.sort_by_key(|r| (r.settlement_date, r.merchant_id));
        records
            .into_iter()
            .map(|r| Settlement::restore(r.clone()).map_err(SettlementStoreError::from))
            .collect()
    }
}

impl SettlementStore for InMemorySettlementStore {
    fn insert(&self, settlement: &Settlement) -> Result<(), SettlementStoreError> {
        Self::ensure_notes_fit(settlement)?;
        let record = settlement.to_record();
        let key = (record.merchant_id, record.settlement_date);

        let mut tables = self
            .tables
            .write()
            .map_err(|_| SettlementStoreError::Poisoned)?;

        if tables.by_merchant_date.contains_key(&key) {
            tracing::warn!(
                merchant_id = %settlement.merchant_id(),
                date = %settlement.settlement_date(),
                "duplicate settlement rejected"
            );
            return Err(SettlementStoreError::Duplicate {
                merchant_id: settlement.merchant_id(),
                settlement_date: settlement.settlement_date(),
            });
        }
        if tables.rows.contains_key(&record.id) {
            return Err(SettlementStoreError::Concurrency(format!(
                "settlement {} already stored",
                record.id
            )));
        }

        tables.by_merchant_date.insert(key, record.id);
        tables.rows.insert(record.id, record);
        Ok(())
    }

    fn update(
        &self,
        settlement: &Settlement,
        expected_version: ExpectedVersion,
    ) -> Result<(), SettlementStoreError> {
        Self::ensure_notes_fit(settlement)?;
        let id = *settlement.id();
        let mut tables = self
            .tables
            .write()
            .map_err(|_| SettlementStoreError::Poisoned)?;

        let stored = tables
            .rows
            .get(&id)
            .ok_or(SettlementStoreError::NotFound(id))?;

        expected_version.check(stored.version).map_err(|e| {
            tracing::warn!(settlement_id = %id, error = %e, "stale settlement update rejected");
            SettlementStoreError::Concurrency(e.to_string())
        })?;

        if stored.merchant_id != settlement.merchant_id().value()
            || stored.settlement_date != settlement.settlement_date()
        {
            return Err(SettlementStoreError::Corrupt(DomainError::invariant(
                "merchant and settlement date cannot change",
            )));
        }

        tracing::debug!(
            settlement_id = %id,
            version = settlement.version(),
            "settlement updated"
        );
        tables.rows.insert(id, settlement.to_record());
        Ok(())
    }

    fn get(&self, id: SettlementId) -> Result<Option<Settlement>, SettlementStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| SettlementStoreError::Poisoned)?;
        tables
            .rows
            .get(&id)
            .map(|r| Settlement::restore(r.clone()))
            .transpose()
            .map_err(SettlementStoreError::from)
    }

    fn find_by_merchant_and_date(
        &self,
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
    ) -> Result<Option<Settlement>, SettlementStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| SettlementStoreError::Poisoned)?;
        tables
            .by_merchant_date
            .get(&(merchant_id.value(), settlement_date))
            .and_then(|id| tables.rows.get(id))
            .map(|r| Settlement::restore(r.clone()))
            .transpose()
            .map_err(SettlementStoreError::from)
    }

    fn list_by_date(
        &self,
        settlement_date: NaiveDate,
    ) -> Result<Vec<Settlement>, SettlementStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| SettlementStoreError::Poisoned)?;
        Self::restore_all(
            tables
                .rows
                .values()
                .filter(|r| r.settlement_date == settlement_date),
        )
    }

    fn list_by_status(
        &self,
        status: SettlementStatus,
    ) -> Result<Vec<Settlement>, SettlementStoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| SettlementStoreError::Poisoned)?;
        Self::restore_all(
            tables
                .rows
                .values()
                .filter(|r| r.status == status.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storefront_core::{Currency, FixedClock, Money};

    fn clock() -> FixedClock {
        FixedClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 5, 0).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
    }

    fn settle(merchant: i64, expected: &str, actual: &str) -> Settlement {
        Settlement::new(
            MerchantId::new(merchant),
            day(),
            Some(Money::parse(expected, Currency::cny()).unwrap()),
            Some(Money::parse(actual, Currency::cny()).unwrap()),
            &clock(),
        )
    }

    #[test]
    fn second_settlement_for_same_merchant_and_day_is_rejected() {
        let store = InMemorySettlementStore::new();
        store.insert(&settle(1, "10.00", "10.00")).unwrap();

        let err = store.insert(&settle(1, "10.00", "12.00")).unwrap_err();
        assert!(matches!(
            err,
            SettlementStoreError::Duplicate { merchant_id, .. } if merchant_id == MerchantId::new(1)
        ));
        assert_eq!(store.list_by_date(day()).unwrap().len(), 1);
    }

    #[test]
    fn stale_update_is_rejected() {
        let store = InMemorySettlementStore::new();
        let mut s = settle(2, "10.00", "8.00");
        store.insert(&s).unwrap();

        s.add_notes(Some("first"), &clock());
        store.update(&s, ExpectedVersion::Exact(0)).unwrap();

        s.add_notes(Some("second"), &clock());
        let err = store.update(&s, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, SettlementStoreError::Concurrency(_)));
    }

    #[test]
    fn update_of_unknown_settlement_is_not_found() {
        let store = InMemorySettlementStore::new();
        let s = settle(3, "1.00", "1.00");
        assert!(matches!(
            store.update(&s, ExpectedVersion::Any),
            Err(SettlementStoreError::NotFound(id)) if id == *s.id()
        ));
    }

    #[test]
    fn notes_longer_than_column_are_rejected() {
        let store = InMemorySettlementStore::new();
        let mut s = settle(4, "5.00", "5.00");
        s.add_notes(Some(&"a".repeat(NOTES_MAX_CHARS + 1)), &clock());
        assert!(matches!(
            store.insert(&s),
            Err(SettlementStoreError::NotesTooLong { chars, max, .. })
                if chars == NOTES_MAX_CHARS + 1 && max == NOTES_MAX_CHARS
        ));
        assert!(store.get(*s.id()).unwrap().is_none());

        s.add_notes(Some("ok"), &clock());
        store.insert(&s).unwrap();

        let text = "b".repeat(NOTES_MAX_CHARS + 1);
        s.add_notes(Some(&text), &clock());
        assert_eq!(s.notes(), text);
        assert!(matches!(
            store.update(&s, ExpectedVersion::Any),
            Err(SettlementStoreError::NotesTooLong { .. })
        ));
        assert_eq!(store.get(*s.id()).unwrap().unwrap().notes(), "ok");
    }

    #[test]
    fn get_missing_is_none() {
        let store = InMemorySettlementStore::new();
        assert!(store.get(SettlementId::new()).unwrap().is_none());
    }
}
