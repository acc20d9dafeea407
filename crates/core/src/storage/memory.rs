use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::SymbolKey;
use crate::models::dividend::Dividend;
use crate::models::holding::HoldingRecord;
use crate::models::user::{AuthToken, User};
use crate::models::watchlist::WatchlistEntry;

use super::traits::{DividendStore, HoldingStore, TokenStore, UserStore, WatchlistStore};

/// In-process store backing every storage trait.
///
/// Each table sits behind its own mutex; uniqueness checks and the write they
/// guard happen under one lock, so concurrent saves cannot both pass.
#[derive(Debug, Default)]
pub struct MemoryStore {
    holdings: Mutex<HashMap<Uuid, HoldingRecord>>,
    watchlist: Mutex<HashMap<Uuid, WatchlistEntry>>,
    users: Mutex<HashMap<Uuid, User>>,
    tokens: Mutex<HashMap<String, AuthToken>>,
    dividends: Mutex<HashMap<Uuid, Dividend>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(table: &Mutex<T>) -> Result<MutexGuard<'_, T>, CoreError> {
    table
        .lock()
        .map_err(|_| CoreError::Internal("store lock poisoned".into()))
}

// ── Holdings ────────────────────────────────────────────────────────

impl HoldingStore for MemoryStore {
    fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<HoldingRecord>, CoreError> {
        let table = lock(&self.holdings)?;
        let mut rows: Vec<HoldingRecord> = table
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.acquired_at.cmp(&b.acquired_at).then_with(|| a.symbol.cmp(&b.symbol)));
        Ok(rows)
    }

    fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<HoldingRecord>, CoreError> {
        let table = lock(&self.holdings)?;
        Ok(table.get(&id).filter(|r| r.owner_id == owner_id).cloned())
    }

    fn save(&self, record: HoldingRecord) -> Result<HoldingRecord, CoreError> {
        let mut table = lock(&self.holdings)?;
        let clash = table
            .values()
            .any(|r| r.id != record.id && r.owner_id == record.owner_id && r.symbol == record.symbol);
        if clash {
            return Err(CoreError::DuplicateSymbol {
                symbol: record.symbol,
            });
        }
        table.insert(record.id, record.clone());
        Ok(record)
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(lock(&self.holdings)?.remove(&id).is_some())
    }

    fn distinct_symbols(&self) -> Result<Vec<SymbolKey>, CoreError> {
        let table = lock(&self.holdings)?;
        let keys: BTreeSet<SymbolKey> = table
            .values()
            .map(|r| SymbolKey {
                class: r.class,
                symbol: r.symbol.clone(),
            })
            .collect();
        Ok(keys.into_iter().collect())
    }
}

// ── Watchlist ───────────────────────────────────────────────────────

impl WatchlistStore for MemoryStore {
    fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<WatchlistEntry>, CoreError> {
        let table = lock(&self.watchlist)?;
        let mut rows: Vec<WatchlistEntry> = table
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.symbol.cmp(&b.symbol)));
        Ok(rows)
    }

    fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<WatchlistEntry>, CoreError> {
        let table = lock(&self.watchlist)?;
        Ok(table.get(&id).filter(|e| e.owner_id == owner_id).cloned())
    }

    fn save(&self, entry: WatchlistEntry) -> Result<WatchlistEntry, CoreError> {
        let mut table = lock(&self.watchlist)?;
        let clash = table
            .values()
            .any(|e| e.id != entry.id && e.owner_id == entry.owner_id && e.symbol == entry.symbol);
        if clash {
            return Err(CoreError::DuplicateSymbol {
                symbol: entry.symbol,
            });
        }
        table.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(lock(&self.watchlist)?.remove(&id).is_some())
    }
}

// ── Users & tokens ──────────────────────────────────────────────────

impl UserStore for MemoryStore {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let table = lock(&self.users)?;
        Ok(table
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        Ok(lock(&self.users)?.get(&id).cloned())
    }

    fn save(&self, user: User) -> Result<User, CoreError> {
        let mut table = lock(&self.users)?;
        let taken = table
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(CoreError::InvalidInput("Email already registered".into()));
        }
        table.insert(user.id, user.clone());
        Ok(user)
    }
}

impl TokenStore for MemoryStore {
    fn save(&self, token: AuthToken) -> Result<(), CoreError> {
        lock(&self.tokens)?.insert(token.token.clone(), token);
        Ok(())
    }

    fn find(&self, token: &str) -> Result<Option<AuthToken>, CoreError> {
        Ok(lock(&self.tokens)?.get(token).cloned())
    }

    fn remove(&self, token: &str) -> Result<(), CoreError> {
        lock(&self.tokens)?.remove(token);
        Ok(())
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        let mut table = lock(&self.tokens)?;
        let before = table.len();
        table.retain(|_, t| !t.is_expired_at(now));
        Ok(before - table.len())
    }
}

// ── Dividends ───────────────────────────────────────────────────────

impl DividendStore for MemoryStore {
    fn save(&self, dividend: Dividend) -> Result<Dividend, CoreError> {
        lock(&self.dividends)?.insert(dividend.id, dividend.clone());
        Ok(dividend)
    }

    fn find_by_ticker(&self, ticker: &str) -> Result<Vec<Dividend>, CoreError> {
        let table = lock(&self.dividends)?;
        let mut rows: Vec<Dividend> = table
            .values()
            .filter(|d| d.ticker.eq_ignore_ascii_case(ticker.trim()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.ex_date.cmp(&a.ex_date));
        Ok(rows)
    }

    fn find_ex_date_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Dividend>, CoreError> {
        let table = lock(&self.dividends)?;
        let mut rows: Vec<Dividend> = table
            .values()
            .filter(|d| d.ex_date.is_some_and(|ex| ex >= from && ex <= to))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.ex_date.cmp(&b.ex_date));
        Ok(rows)
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(lock(&self.dividends)?.remove(&id).is_some())
    }
}
