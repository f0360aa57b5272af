// ABOUTME: Textile material type definitions
// ABOUTME: Materials with trilingual names and the care symbols typically found on them

use chrono::{DateTime, Utc};
use laundrylens_core::{Frequency, SymbolCategory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub code: String,
    pub name_ko: String,
    pub name_en: String,
    pub name_jp: String,
    pub description: Option<String>,
    pub care_tips: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A care symbol linked to a material and how often it appears on its labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSymbol {
    pub symbol_id: String,
    pub code: String,
    pub icon_url: Option<String>,
    pub category: SymbolCategory,
    pub frequency: Frequency,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDetail {
    #[serde(flatten)]
    pub material: Material,
    pub symbols: Vec<MaterialSymbol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialList {
    pub materials: Vec<Material>,
    pub total: usize,
}
