use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::SymbolKey;
use crate::models::dividend::Dividend;
use crate::models::holding::HoldingRecord;
use crate::models::user::{AuthToken, User};
use crate::models::watchlist::WatchlistEntry;

/// Persistence of holdings, one owner's rows at a time.
///
/// Implementations enforce uniqueness of `(owner_id, symbol)` and report a
/// clash as `CoreError::DuplicateSymbol`.
pub trait HoldingStore: Send + Sync {
    fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<HoldingRecord>, CoreError>;

    fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<HoldingRecord>, CoreError>;

    /// Insert, or replace the row with the same id.
    fn save(&self, record: HoldingRecord) -> Result<HoldingRecord, CoreError>;

    /// Returns whether a row was removed.
    fn delete_by_id(&self, id: Uuid) -> Result<bool, CoreError>;

    /// Every distinct `(class, symbol)` held by anyone.
    fn distinct_symbols(&self) -> Result<Vec<SymbolKey>, CoreError>;
}

/// Same shape as [`HoldingStore`], for watchlist entries.
pub trait WatchlistStore: Send + Sync {
    fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<WatchlistEntry>, CoreError>;

    fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<WatchlistEntry>, CoreError>;

    fn save(&self, entry: WatchlistEntry) -> Result<WatchlistEntry, CoreError>;

    fn delete_by_id(&self, id: Uuid) -> Result<bool, CoreError>;
}

pub trait UserStore: Send + Sync {
    /// Case-insensitive on the email address.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError>;

    /// Insert or replace by id. A second user with the same email is rejected.
    fn save(&self, user: User) -> Result<User, CoreError>;
}

pub trait TokenStore: Send + Sync {
    fn save(&self, token: AuthToken) -> Result<(), CoreError>;

    fn find(&self, token: &str) -> Result<Option<AuthToken>, CoreError>;

    fn remove(&self, token: &str) -> Result<(), CoreError>;

    /// Drop every token expired at `now`. Returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError>;
}

pub trait DividendStore: Send + Sync {
    fn save(&self, dividend: Dividend) -> Result<Dividend, CoreError>;

    /// Newest ex-date first.
    fn find_by_ticker(&self, ticker: &str) -> Result<Vec<Dividend>, CoreError>;

    /// Ex-date within `[from, to]`, oldest first.
    fn find_ex_date_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Dividend>, CoreError>;

    fn delete_by_id(&self, id: Uuid) -> Result<bool, CoreError>;
}
