// ABOUTME: Laundry symbol type definitions
// ABOUTME: Symbols, their per-language texts, and supported display languages

use chrono::{DateTime, Utc};
use laundrylens_core::SymbolCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundrySymbol {
    pub id: String,
    pub category: SymbolCategory,
    pub code: String,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTranslation {
    pub id: String,
    pub country_code: String,
    pub name: String,
    pub short_desc: String,
    pub detail_desc: String,
}

/// Symbol with the translations for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetail {
    #[serde(flatten)]
    pub symbol: LaundrySymbol,
    pub translations: Vec<SymbolTranslation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolList {
    pub symbols: Vec<LaundrySymbol>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub name_ko: String,
    pub name_en: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryList {
    pub countries: Vec<Country>,
}

impl CountryList {
    pub fn supported() -> Self {
        let country = |code: &str, name_ko: &str, name_en: &str| Country {
            code: code.to_string(),
            name_ko: name_ko.to_string(),
            name_en: name_en.to_string(),
        };

        Self {
            countries: vec![
                country("ko", "한국어", "Korean"),
                country("en", "영어", "English"),
                country("jp", "일본어", "Japanese"),
            ],
        }
    }
}
