// ABOUTME: Laundry symbol storage layer using SQLite
// ABOUTME: Lists symbols in category order and loads translations for a requested language

use std::collections::HashMap;

use laundrylens_core::SymbolCategory;
use laundrylens_storage::{parse_timestamp, StorageError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, SqlitePool};
use tracing::debug;

use super::types::{LaundrySymbol, SymbolDetail, SymbolTranslation};

/// Category rank matching the care-label reading order
const CATEGORY_ORDER: &str = "CASE category \
    WHEN 'WASH' THEN 0 WHEN 'BLEACH' THEN 1 WHEN 'DRY' THEN 2 \
    WHEN 'IRON' THEN 3 WHEN 'DRYCLEAN' THEN 4 ELSE 5 END";

#[derive(Clone)]
pub struct SymbolStorage {
    pool: SqlitePool,
}

impl SymbolStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        category: Option<SymbolCategory>,
    ) -> Result<Vec<LaundrySymbol>, StorageError> {
        debug!("Listing symbols (category: {:?})", category);

        let mut query_builder =
            QueryBuilder::new("SELECT id, category, code, icon_url, created_at FROM laundry_symbols");
        if let Some(category) = category {
            query_builder.push(" WHERE category = ");
            query_builder.push_bind(category.as_str());
        }
        query_builder.push(format!(" ORDER BY {}, code ASC", CATEGORY_ORDER));

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_symbol).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<LaundrySymbol>, StorageError> {
        debug!("Fetching symbol: {}", id);

        let row = sqlx::query(
            "SELECT id, category, code, icon_url, created_at FROM laundry_symbols WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_symbol).transpose()
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<LaundrySymbol>, StorageError> {
        debug!("Fetching symbol by code: {}", code);

        let row = sqlx::query(
            "SELECT id, category, code, icon_url, created_at FROM laundry_symbols WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_symbol).transpose()
    }

    pub async fn translations(
        &self,
        symbol_id: &str,
        lang: &str,
    ) -> Result<Vec<SymbolTranslation>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, symbol_id, country_code, name, short_desc, detail_desc
            FROM symbol_translations
            WHERE symbol_id = ? AND country_code = ?
            "#,
        )
        .bind(symbol_id)
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_translation).collect()
    }

    /// Symbols of one category with their `lang` translations, ordered by code
    pub async fn list_with_translations(
        &self,
        category: SymbolCategory,
        lang: &str,
    ) -> Result<Vec<SymbolDetail>, StorageError> {
        debug!("Listing {} symbols with '{}' translations", category, lang);

        let symbols = self.list(Some(category)).await?;

        let rows = sqlx::query(
            r#"
            SELECT t.id, t.symbol_id, t.country_code, t.name, t.short_desc, t.detail_desc
            FROM symbol_translations t
            JOIN laundry_symbols s ON s.id = t.symbol_id
            WHERE s.category = ? AND t.country_code = ?
            "#,
        )
        .bind(category.as_str())
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        let mut by_symbol: HashMap<String, Vec<SymbolTranslation>> = HashMap::new();
        for row in &rows {
            let symbol_id: String = row.try_get("symbol_id")?;
            by_symbol
                .entry(symbol_id)
                .or_default()
                .push(row_to_translation(row)?);
        }

        Ok(symbols
            .into_iter()
            .map(|symbol| SymbolDetail {
                translations: by_symbol.remove(&symbol.id).unwrap_or_default(),
                symbol,
            })
            .collect())
    }

    /// Map of code to id for the codes present in the catalog
    pub async fn ids_for_codes(
        &self,
        codes: &[String],
    ) -> Result<HashMap<String, String>, StorageError> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query_builder = QueryBuilder::new("SELECT id, code FROM laundry_symbols WHERE code IN (");
        let mut separated = query_builder.separated(", ");
        for code in codes {
            separated.push_bind(code);
        }
        separated.push_unseparated(")");

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> Result<(String, String), StorageError> {
                Ok((row.try_get("code")?, row.try_get("id")?))
            })
            .collect()
    }
}

fn row_to_symbol(row: &SqliteRow) -> Result<LaundrySymbol, StorageError> {
    let category: String = row.try_get("category")?;
    Ok(LaundrySymbol {
        id: row.try_get("id")?,
        category: category
            .parse::<SymbolCategory>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        code: row.try_get("code")?,
        icon_url: row.try_get("icon_url")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_translation(row: &SqliteRow) -> Result<SymbolTranslation, StorageError> {
    Ok(SymbolTranslation {
        id: row.try_get("id")?,
        country_code: row.try_get("country_code")?,
        name: row.try_get("name")?,
        short_desc: row.try_get("short_desc")?,
        detail_desc: row.try_get("detail_desc")?,
    })
}
