// ═══════════════════════════════════════════════════════════════════
// Storage Tests — MemoryStore behind every store trait
// ═══════════════════════════════════════════════════════════════════

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::asset::{AssetClass, SymbolKey};
use portfolio_tracker_core::models::dividend::Dividend;
use portfolio_tracker_core::models::holding::HoldingRecord;
use portfolio_tracker_core::models::user::{AuthToken, TokenPurpose, User};
use portfolio_tracker_core::models::watchlist::WatchlistEntry;
use portfolio_tracker_core::storage::memory::MemoryStore;
use portfolio_tracker_core::storage::traits::{
    DividendStore, HoldingStore, TokenStore, UserStore, WatchlistStore,
};

fn record(owner: Uuid, class: AssetClass, symbol: &str, day: u32) -> HoldingRecord {
    HoldingRecord {
        id: Uuid::new_v4(),
        owner_id: owner,
        class,
        symbol: symbol.into(),
        name: symbol.into(),
        quantity: 1.0,
        avg_cost_price: 10.0,
        acquired_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        sector: None,
        tags: "[]".into(),
    }
}

fn entry(owner: Uuid, symbol: &str) -> WatchlistEntry {
    WatchlistEntry {
        id: Uuid::new_v4(),
        owner_id: owner,
        class: AssetClass::Equity,
        symbol: symbol.into(),
        name: symbol.into(),
        added_at: Utc::now(),
    }
}

fn user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.into(),
        password_hash: "$argon2id$stub".into(),
        created_at: Utc::now(),
    }
}

// ── Holdings ────────────────────────────────────────────────────────

mod holdings {
    use super::*;

    #[test]
    fn owner_rows_are_ordered_by_acquisition() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        HoldingStore::save(&store, record(owner, AssetClass::Equity, "LATE", 20)).unwrap();
        HoldingStore::save(&store, record(owner, AssetClass::Equity, "EARLY", 2)).unwrap();
        HoldingStore::save(&store, record(Uuid::new_v4(), AssetClass::Equity, "OTHER", 1)).unwrap();

        let symbols: Vec<String> = HoldingStore::find_by_owner(&store, owner)
            .unwrap()
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(symbols, vec!["EARLY", "LATE"]);
    }

    #[test]
    fn symbol_is_unique_per_owner_only() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let first = HoldingStore::save(&store, record(alice, AssetClass::Equity, "TCS", 1)).unwrap();

        let clash = HoldingStore::save(&store, record(alice, AssetClass::Equity, "TCS", 2));
        assert!(matches!(clash, Err(CoreError::DuplicateSymbol { .. })));

        assert!(HoldingStore::save(&store, record(Uuid::new_v4(), AssetClass::Equity, "TCS", 1)).is_ok());

        // Re-saving the same id is an update, not a clash
        let mut edited = first.clone();
        edited.quantity = 9.0;
        HoldingStore::save(&store, edited).unwrap();
        let row = HoldingStore::find_by_id_and_owner(&store, first.id, alice).unwrap().unwrap();
        assert_eq!(row.quantity, 9.0);
    }

    #[test]
    fn lookups_are_owner_scoped() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let row = HoldingStore::save(&store, record(owner, AssetClass::Equity, "ITC", 1)).unwrap();

        assert!(HoldingStore::find_by_id_and_owner(&store, row.id, Uuid::new_v4()).unwrap().is_none());
        assert!(HoldingStore::delete_by_id(&store, row.id).unwrap());
        assert!(!HoldingStore::delete_by_id(&store, row.id).unwrap());
    }

    #[test]
    fn distinct_symbols_span_owners_and_classes() {
        let store = MemoryStore::new();
        HoldingStore::save(&store, record(Uuid::new_v4(), AssetClass::Equity, "TCS", 1)).unwrap();
        HoldingStore::save(&store, record(Uuid::new_v4(), AssetClass::Equity, "TCS", 1)).unwrap();
        HoldingStore::save(&store, record(Uuid::new_v4(), AssetClass::Crypto, "bitcoin", 1)).unwrap();

        let keys = store.distinct_symbols().unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&SymbolKey::new("TCS", AssetClass::Equity)));
        assert!(keys.contains(&SymbolKey::new("bitcoin", AssetClass::Crypto)));
    }

    #[test]
    fn concurrent_duplicate_saves_admit_one() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    HoldingStore::save(store.as_ref(), record(owner, AssetClass::Equity, "RACE", 1)).is_ok()
                })
            })
            .collect();
        let wins = handles.into_iter().filter_map(|h| h.join().ok()).filter(|won| *won).count();

        assert_eq!(wins, 1);
        assert_eq!(HoldingStore::find_by_owner(store.as_ref(), owner).unwrap().len(), 1);
    }
}

// ── Watchlist ───────────────────────────────────────────────────────

mod watchlist {
    use super::*;

    #[test]
    fn duplicate_symbol_rejected_and_delete() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let saved = WatchlistStore::save(&store, entry(owner, "INFY")).unwrap();

        assert!(matches!(
            WatchlistStore::save(&store, entry(owner, "INFY")),
            Err(CoreError::DuplicateSymbol { .. })
        ));
        assert_eq!(WatchlistStore::find_by_owner(&store, owner).unwrap().len(), 1);
        assert!(WatchlistStore::find_by_id_and_owner(&store, saved.id, Uuid::new_v4()).unwrap().is_none());

        assert!(WatchlistStore::delete_by_id(&store, saved.id).unwrap());
        assert!(WatchlistStore::find_by_owner(&store, owner).unwrap().is_empty());
    }
}

// ── Users & tokens ──────────────────────────────────────────────────

mod users {
    use super::*;

    #[test]
    fn email_lookup_ignores_case() {
        let store = MemoryStore::new();
        let saved = UserStore::save(&store, user("ada@example.com")).unwrap();

        let found = store.find_by_email(" ADA@Example.com ").unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert!(store.find_by_id(saved.id).unwrap().is_some());

        let clash = UserStore::save(&store, user("Ada@Example.COM"));
        assert!(matches!(clash, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn tokens_round_trip_and_remove() {
        let store = MemoryStore::new();
        let token = AuthToken {
            token: "abc123".into(),
            user_id: Uuid::new_v4(),
            purpose: TokenPurpose::Session,
            expires_at: Utc::now() + Duration::hours(1),
        };
        TokenStore::save(&store, token.clone()).unwrap();
        assert_eq!(store.find("abc123").unwrap(), Some(token));

        store.remove("abc123").unwrap();
        assert!(store.find("abc123").unwrap().is_none());
        // Removing twice is fine
        store.remove("abc123").unwrap();
    }

    #[test]
    fn purge_drops_only_expired_tokens() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let token = |name: &str, offset: Duration| AuthToken {
            token: name.into(),
            user_id: Uuid::new_v4(),
            purpose: TokenPurpose::Session,
            expires_at: now + offset,
        };
        TokenStore::save(&store, token("stale", Duration::minutes(-5))).unwrap();
        TokenStore::save(&store, token("edge", Duration::zero())).unwrap();
        TokenStore::save(&store, token("fresh", Duration::hours(1))).unwrap();

        assert_eq!(store.purge_expired(now).unwrap(), 2);
        assert!(store.find("stale").unwrap().is_none());
        assert!(store.find("edge").unwrap().is_none());
        assert!(store.find("fresh").unwrap().is_some());
        assert_eq!(store.purge_expired(now).unwrap(), 0);
    }
}

// ── Dividends ───────────────────────────────────────────────────────

mod dividends {
    use super::*;

    fn on(ticker: &str, month: u32) -> Dividend {
        Dividend::fetched(ticker, 1.0, Utc.with_ymd_and_hms(2030, month, 1, 0, 0, 0).unwrap(), "test")
    }

    #[test]
    fn ticker_lookup_is_newest_first() {
        let store = MemoryStore::new();
        DividendStore::save(&store, on("IBM", 2)).unwrap();
        DividendStore::save(&store, on("IBM", 9)).unwrap();
        DividendStore::save(&store, on("ITC", 5)).unwrap();

        let rows = store.find_by_ticker("ibm").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ex_date > rows[1].ex_date);
    }

    #[test]
    fn range_is_inclusive_and_ascending() {
        let store = MemoryStore::new();
        for month in [7, 3, 5, 11] {
            DividendStore::save(&store, on("X", month)).unwrap();
        }
        let mut undated = on("X", 1);
        undated.ex_date = None;
        DividendStore::save(&store, undated).unwrap();

        let from = Utc.with_ymd_and_hms(2030, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2030, 7, 1, 0, 0, 0).unwrap();
        let months: Vec<_> = store
            .find_ex_date_between(from, to)
            .unwrap()
            .into_iter()
            .filter_map(|d| d.ex_date)
            .collect();
        assert_eq!(months.len(), 3);
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn delete_reports_presence() {
        let store = MemoryStore::new();
        let d = DividendStore::save(&store, on("IBM", 1)).unwrap();
        assert!(DividendStore::delete_by_id(&store, d.id).unwrap());
        assert!(!DividendStore::delete_by_id(&store, d.id).unwrap());
    }
}
