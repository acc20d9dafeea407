// ═══════════════════════════════════════════════════════════════════
// Model Tests — AssetClass, normalize, PriceQuote/PriceMap, holdings,
// watchlist input, settings, dividends
// ═══════════════════════════════════════════════════════════════════

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::asset::{normalize, AssetClass, SymbolKey};
use portfolio_tracker_core::models::dividend::Dividend;
use portfolio_tracker_core::models::holding::{decode_tags, encode_tags, Holding, HoldingInput, HoldingRecord};
use portfolio_tracker_core::models::quote::{PriceMap, PriceQuote, PriceSource};
use portfolio_tracker_core::models::settings::{parse_lifetime, Settings, MAX_CONCURRENCY_CAP};
use portfolio_tracker_core::models::watchlist::WatchlistInput;

fn holding(symbol: &str, class: AssetClass, tags: Vec<&str>) -> Holding {
    Holding {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        class,
        symbol: symbol.into(),
        name: symbol.into(),
        quantity: 2.5,
        avg_cost_price: 100.0,
        acquired_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap(),
        sector: None,
        tags: tags.into_iter().map(String::from).collect(),
    }
}

// ── AssetClass ──────────────────────────────────────────────────────

mod asset_class {
    use super::*;

    #[test]
    fn parses_canonical_and_legacy_labels() {
        assert_eq!("equity".parse::<AssetClass>().unwrap(), AssetClass::Equity);
        assert_eq!("stocks".parse::<AssetClass>().unwrap(), AssetClass::Equity);
        assert_eq!(" Stock ".parse::<AssetClass>().unwrap(), AssetClass::Equity);
        assert_eq!("crypto".parse::<AssetClass>().unwrap(), AssetClass::Crypto);
        assert_eq!("mutual".parse::<AssetClass>().unwrap(), AssetClass::MutualFund);
        assert_eq!("mf".parse::<AssetClass>().unwrap(), AssetClass::MutualFund);
        assert_eq!("other".parse::<AssetClass>().unwrap(), AssetClass::Other);
    }

    #[test]
    fn unknown_label_is_invalid_input() {
        let err = "bonds".parse::<AssetClass>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn serde_accepts_legacy_labels() {
        let class: AssetClass = serde_json::from_str("\"stock\"").unwrap();
        assert_eq!(class, AssetClass::Equity);
        let class: AssetClass = serde_json::from_str("\"mutual_fund\"").unwrap();
        assert_eq!(class, AssetClass::MutualFund);
        assert_eq!(serde_json::to_string(&AssetClass::MutualFund).unwrap(), "\"mutual_fund\"");
    }

    #[test]
    fn display_matches_as_str() {
        for class in AssetClass::ALL {
            assert_eq!(class.to_string(), class.as_str());
        }
    }
}

// ── normalize / SymbolKey ───────────────────────────────────────────

mod normalization {
    use super::*;

    #[test]
    fn equities_are_trimmed_and_uppercased() {
        assert_eq!(normalize("  tcs ", AssetClass::Equity), "TCS");
        assert_eq!(normalize("reliance.ns", AssetClass::Equity), "RELIANCE.NS");
        assert_eq!(normalize("axis bluechip", AssetClass::MutualFund), "AXIS BLUECHIP");
    }

    #[test]
    fn crypto_slugs_are_lowercased() {
        assert_eq!(normalize(" Bitcoin ", AssetClass::Crypto), "bitcoin");
    }

    #[test]
    fn blank_is_empty() {
        assert_eq!(normalize("   ", AssetClass::Equity), "");
        assert!(!SymbolKey::new("\t", AssetClass::Crypto).is_resolvable());
    }

    #[test]
    fn idempotent_for_every_class() {
        let samples = ["tcs", " Infy ", "bitcoin", "ETH", "", "  a b  ", "ünïcode"];
        for class in AssetClass::ALL {
            for raw in samples {
                let once = normalize(raw, class);
                assert_eq!(normalize(&once, class), once, "{class} {raw:?}");
            }
        }
    }

    #[test]
    fn keys_of_different_classes_differ() {
        let a = SymbolKey::new("eth", AssetClass::Equity);
        let b = SymbolKey::new("eth", AssetClass::Crypto);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "equity:ETH");
        assert_eq!(b.to_string(), "crypto:eth");
    }
}

// ── PriceQuote / PriceMap ───────────────────────────────────────────

mod quotes {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite() {
        let key = SymbolKey::new("TCS", AssetClass::Equity);
        assert!(PriceQuote::new(&key, 0.0, PriceSource::Nse).is_none());
        assert!(PriceQuote::new(&key, -1.0, PriceSource::Nse).is_none());
        assert!(PriceQuote::new(&key, f64::NAN, PriceSource::Nse).is_none());
        assert!(PriceQuote::new(&key, f64::INFINITY, PriceSource::Nse).is_none());
        let q = PriceQuote::new(&key, 3850.0, PriceSource::Nse).unwrap();
        assert_eq!(q.price(), 3850.0);
        assert_eq!(q.source(), PriceSource::Nse);
        assert_eq!(q.key(), key);
    }

    #[test]
    fn map_lookup_normalizes_per_class() {
        let mut map = PriceMap::new();
        map.insert(PriceQuote::new(&SymbolKey::new("TCS", AssetClass::Equity), 10.0, PriceSource::Nse).unwrap());
        map.insert(
            PriceQuote::new(&SymbolKey::new("bitcoin", AssetClass::Crypto), 20.0, PriceSource::CoinGecko).unwrap(),
        );

        assert_eq!(map.price_of(AssetClass::Equity, " tcs "), Some(10.0));
        assert_eq!(map.price_of(AssetClass::Crypto, "BITCOIN"), Some(20.0));
        assert_eq!(map.price_of(AssetClass::Crypto, "TCS"), None);
        assert_eq!(map.for_class(AssetClass::Equity).len(), 1);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn later_insert_replaces_earlier() {
        let key = SymbolKey::new("INFY", AssetClass::Equity);
        let map: PriceMap = [
            PriceQuote::new(&key, 1.0, PriceSource::Nse).unwrap(),
            PriceQuote::new(&key, 2.0, PriceSource::YahooFinance).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(AssetClass::Equity, "INFY").unwrap().source(), PriceSource::YahooFinance);
    }
}

// ── Holdings ────────────────────────────────────────────────────────

mod holdings {
    use super::*;

    #[test]
    fn tags_round_trip_in_order() {
        let tags = vec!["long term".to_string(), "IT".to_string(), "\"quoted\"".to_string(), "ünï".to_string()];
        let encoded = encode_tags(&tags).unwrap();
        assert_eq!(decode_tags(&encoded).unwrap(), tags);
    }

    #[test]
    fn blank_tag_column_is_empty() {
        assert!(decode_tags("").unwrap().is_empty());
        assert!(decode_tags("   ").unwrap().is_empty());
        assert!(decode_tags("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_tag_column_is_serialization_error() {
        assert!(matches!(decode_tags("not json"), Err(CoreError::Serialization(_))));
    }

    #[test]
    fn record_round_trip() {
        let h = holding("TCS", AssetClass::Equity, vec!["core", "india"]);
        let record = HoldingRecord::try_from(&h).unwrap();
        assert_eq!(record.tags, r#"["core","india"]"#);
        assert_eq!(Holding::try_from(record).unwrap(), h);
    }

    #[test]
    fn cost_basis_and_key() {
        let h = holding("bitcoin", AssetClass::Crypto, vec![]);
        assert_eq!(h.cost_basis(), 250.0);
        assert_eq!(h.key(), SymbolKey::new("bitcoin", AssetClass::Crypto));
    }

    #[test]
    fn input_accepts_original_field_names() {
        let input: HoldingInput = serde_json::from_value(serde_json::json!({
            "type": "stock",
            "symbol": " infy ",
            "quantity": 4,
            "avgBuyPrice": 1500.5,
        }))
        .unwrap();
        assert_eq!(input.class(), AssetClass::Equity);
        assert_eq!(input.normalized_symbol(), "INFY");
        assert_eq!(input.avg_cost_price, 1500.5);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn input_defaults_to_equity() {
        let input = HoldingInput {
            symbol: "tcs".into(),
            quantity: 1.0,
            ..Default::default()
        };
        assert_eq!(input.class(), AssetClass::Equity);
    }

    #[test]
    fn input_validation() {
        let base = HoldingInput {
            symbol: "TCS".into(),
            quantity: 1.0,
            avg_cost_price: 10.0,
            ..Default::default()
        };
        assert!(base.validate().is_ok());

        for bad in [
            HoldingInput { symbol: "  ".into(), ..base.clone() },
            HoldingInput { quantity: -3.0, ..base.clone() },
            HoldingInput { quantity: f64::NAN, ..base.clone() },
            HoldingInput { avg_cost_price: -0.01, ..base.clone() },
        ] {
            assert!(matches!(bad.validate(), Err(CoreError::InvalidInput(_))), "{bad:?}");
        }

        let free = HoldingInput { avg_cost_price: 0.0, ..base.clone() };
        assert!(free.validate().is_ok());

        // A fully sold-down position stays on the books at zero units
        let emptied = HoldingInput { quantity: 0.0, ..base };
        assert!(emptied.validate().is_ok());
    }

    #[test]
    fn blank_name_is_not_provided() {
        let input = HoldingInput {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(input.provided_name(), None);
        let input = HoldingInput {
            name: Some(" Tata ".into()),
            ..Default::default()
        };
        assert_eq!(input.provided_name(), Some("Tata"));
    }
}

// ── Watchlist ───────────────────────────────────────────────────────

mod watchlist {
    use super::*;

    #[test]
    fn input_normalizes_by_class() {
        let input: WatchlistInput =
            serde_json::from_value(serde_json::json!({ "type": "crypto", "symbol": " Ethereum " })).unwrap();
        assert_eq!(input.normalized_symbol(), "ethereum");
        assert!(input.validate().is_ok());

        let blank = WatchlistInput {
            symbol: " ".into(),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }
}

// ── Settings ────────────────────────────────────────────────────────

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.reporting_currency, "INR");
        assert_eq!(s.effective_concurrency(), MAX_CONCURRENCY_CAP);
        assert_eq!(s.request_timeout().as_millis(), 4000);
        assert_eq!(s.token_lifetime().unwrap(), chrono::Duration::days(7));
    }

    #[test]
    fn concurrency_is_clamped() {
        let s = Settings {
            max_concurrency: 0,
            ..Settings::default()
        };
        assert_eq!(s.effective_concurrency(), 1);
        let s = Settings {
            max_concurrency: 500,
            ..Settings::default()
        };
        assert_eq!(s.effective_concurrency(), MAX_CONCURRENCY_CAP);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut s = Settings::default();
        s.api_keys.insert("alphavantage".into(), "   ".into());
        s.api_keys.insert("coingecko".into(), " cg-key ".into());
        assert_eq!(s.api_key("alphavantage"), None);
        assert_eq!(s.api_key("coingecko"), Some("cg-key"));
        assert_eq!(s.api_key("nse"), None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"search_limit": 3, "api_keys": {"alphavantage": "k"}}"#).unwrap();
        assert_eq!(s.search_limit, 3);
        assert_eq!(s.enrich_top_n, 8);
        assert_eq!(s.api_key("alphavantage"), Some("k"));
        assert_eq!(s.endpoints.coingecko, "https://api.coingecko.com/api/v3");
    }

    #[test]
    fn lifetime_units() {
        assert_eq!(parse_lifetime("7d").unwrap(), chrono::Duration::days(7));
        assert_eq!(parse_lifetime("12h").unwrap(), chrono::Duration::hours(12));
        assert_eq!(parse_lifetime("30m").unwrap(), chrono::Duration::minutes(30));
        assert_eq!(parse_lifetime("45s").unwrap(), chrono::Duration::seconds(45));
        assert_eq!(parse_lifetime("250ms").unwrap(), chrono::Duration::milliseconds(250));
        assert_eq!(parse_lifetime(" 86400000 ").unwrap(), chrono::Duration::days(1));
    }

    #[test]
    fn lifetime_rejects_garbage() {
        for raw in ["", "d", "0d", "-5h", "7 days", "1.5h", "abc"] {
            assert!(matches!(parse_lifetime(raw), Err(CoreError::InvalidInput(_))), "{raw:?}");
        }
    }
}

// ── Dividends ───────────────────────────────────────────────────────

mod dividends {
    use super::*;

    #[test]
    fn fetched_record_is_normalized() {
        let ex = Utc.with_ymd_and_hms(2024, 8, 9, 0, 0, 0).unwrap();
        let d = Dividend::fetched(" ibm ", 1.67, ex, "alphavantage");
        assert_eq!(d.ticker, "IBM");
        assert_eq!(d.amount, Some(1.67));
        assert_eq!(d.ex_date, Some(ex));
        assert_eq!(d.currency.as_deref(), Some("USD"));
        assert!(d.fetched_at.is_some());
    }

    #[test]
    fn deserializes_with_generated_id() {
        let d: Dividend = serde_json::from_value(serde_json::json!({
            "ticker": "ITC",
            "amount": 6.25,
            "exDate": "2024-06-04T00:00:00Z",
            "payDate": "2024-06-28T00:00:00Z",
        }))
        .unwrap();
        assert_ne!(d.id, Uuid::nil());
        assert!(d.pay_date.is_some());
        assert!(d.record_date.is_none());
    }
}
