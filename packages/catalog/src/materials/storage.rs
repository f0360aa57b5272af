// ABOUTME: Material storage layer using SQLite
// ABOUTME: Substring search across names and codes, and symbol links ordered by frequency

use laundrylens_core::{Frequency, SymbolCategory};
use laundrylens_storage::{parse_timestamp, StorageError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use super::types::{Material, MaterialSymbol};

const MATERIAL_COLUMNS: &str =
    "id, code, name_ko, name_en, name_jp, description, care_tips, created_at";

#[derive(Clone)]
pub struct MaterialStorage {
    pool: SqlitePool,
}

impl MaterialStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All materials ordered by Korean name, optionally filtered by a substring of any name or the code
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Material>, StorageError> {
        debug!("Listing materials (search: {:?})", search);

        let rows = match search {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                sqlx::query(&format!(
                    r#"
                    SELECT {}
                    FROM materials
                    WHERE name_ko LIKE ?1 ESCAPE '\'
                       OR name_en LIKE ?1 ESCAPE '\'
                       OR name_jp LIKE ?1 ESCAPE '\'
                       OR code LIKE ?1 ESCAPE '\'
                    ORDER BY name_ko ASC
                    "#,
                    MATERIAL_COLUMNS
                ))
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM materials ORDER BY name_ko ASC",
                    MATERIAL_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_material).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Material>, StorageError> {
        debug!("Fetching material: {}", id);

        let row = sqlx::query(&format!(
            "SELECT {} FROM materials WHERE id = ?",
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_material).transpose()
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Material>, StorageError> {
        debug!("Fetching material by code: {}", code);

        let row = sqlx::query(&format!(
            "SELECT {} FROM materials WHERE code = ?",
            MATERIAL_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_material).transpose()
    }

    /// Linked symbols, ALWAYS first, then OFTEN, then SOMETIMES
    pub async fn symbols_for(&self, material_id: &str) -> Result<Vec<MaterialSymbol>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id AS symbol_id, s.code, s.icon_url, s.category, ms.frequency, ms.note
            FROM material_symbols ms
            JOIN laundry_symbols s ON s.id = ms.symbol_id
            WHERE ms.material_id = ?
            ORDER BY CASE ms.frequency
                WHEN 'ALWAYS' THEN 0 WHEN 'OFTEN' THEN 1 WHEN 'SOMETIMES' THEN 2 ELSE 3 END,
                s.code ASC
            "#,
        )
        .bind(material_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_material_symbol).collect()
    }
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_material(row: &SqliteRow) -> Result<Material, StorageError> {
    Ok(Material {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name_ko: row.try_get("name_ko")?,
        name_en: row.try_get("name_en")?,
        name_jp: row.try_get("name_jp")?,
        description: row.try_get("description")?,
        care_tips: row.try_get("care_tips")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_material_symbol(row: &SqliteRow) -> Result<MaterialSymbol, StorageError> {
    let category: String = row.try_get("category")?;
    let frequency: String = row.try_get("frequency")?;
    Ok(MaterialSymbol {
        symbol_id: row.try_get("symbol_id")?,
        code: row.try_get("code")?,
        icon_url: row.try_get("icon_url")?,
        category: category
            .parse::<SymbolCategory>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        frequency: frequency
            .parse::<Frequency>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        note: row.try_get("note")?,
    })
}
