use serde::{Deserialize, Serialize};

/// One symbol-search result.
///
/// `price` is only filled for hits that went through quote enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "exchange")]
    pub exchange_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl SearchHit {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, exchange_label: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange_label: exchange_label.into(),
            price: None,
        }
    }
}
