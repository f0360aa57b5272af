// ABOUTME: Reference data seeding for the catalog
// ABOUTME: Upserts the bundled laundry symbols, translations, materials, and symbol links

use laundrylens_core::{generate_id, Frequency, SymbolCategory};
use laundrylens_storage::{now_timestamp, StorageError, StorageResult};
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use tracing::info;

const SYMBOLS_JSON: &str = include_str!("../data/symbols.json");
const MATERIALS_JSON: &str = include_str!("../data/materials.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolSeed {
    code: String,
    category: SymbolCategory,
    icon_url: Option<String>,
    translations: Vec<TranslationSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationSeed {
    country_code: String,
    name: String,
    short_desc: String,
    detail_desc: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialSeed {
    code: String,
    name_ko: String,
    name_en: String,
    name_jp: String,
    description: Option<String>,
    care_tips: Option<String>,
    symbols: Vec<MaterialSymbolSeed>,
}

#[derive(Debug, Deserialize)]
struct MaterialSymbolSeed {
    code: String,
    frequency: Frequency,
    note: Option<String>,
}

/// Row counts written by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub symbols: usize,
    pub translations: usize,
    pub materials: usize,
    pub material_symbols: usize,
}

/// Insert or refresh all bundled catalog data in one transaction. Safe to run repeatedly.
pub async fn seed_catalog(pool: &SqlitePool) -> StorageResult<SeedReport> {
    let symbols: Vec<SymbolSeed> = serde_json::from_str(SYMBOLS_JSON)?;
    let materials: Vec<MaterialSeed> = serde_json::from_str(MATERIALS_JSON)?;

    let now = now_timestamp();
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    for symbol in &symbols {
        let row = sqlx::query(
            r#"
            INSERT INTO laundry_symbols (id, category, code, icon_url, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(code) DO UPDATE SET
                category = excluded.category,
                icon_url = excluded.icon_url
            RETURNING id
            "#,
        )
        .bind(generate_id())
        .bind(symbol.category.as_str())
        .bind(&symbol.code)
        .bind(&symbol.icon_url)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;
        let symbol_id: String = row.try_get("id")?;
        report.symbols += 1;

        for translation in &symbol.translations {
            sqlx::query(
                r#"
                INSERT INTO symbol_translations (id, symbol_id, country_code, name, short_desc, detail_desc)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(symbol_id, country_code) DO UPDATE SET
                    name = excluded.name,
                    short_desc = excluded.short_desc,
                    detail_desc = excluded.detail_desc
                "#,
            )
            .bind(generate_id())
            .bind(&symbol_id)
            .bind(&translation.country_code)
            .bind(&translation.name)
            .bind(&translation.short_desc)
            .bind(&translation.detail_desc)
            .execute(&mut *tx)
            .await?;
            report.translations += 1;
        }
    }

    for material in &materials {
        let row = sqlx::query(
            r#"
            INSERT INTO materials (id, code, name_ko, name_en, name_jp, description, care_tips, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(code) DO UPDATE SET
                name_ko = excluded.name_ko,
                name_en = excluded.name_en,
                name_jp = excluded.name_jp,
                description = excluded.description,
                care_tips = excluded.care_tips
            RETURNING id
            "#,
        )
        .bind(generate_id())
        .bind(&material.code)
        .bind(&material.name_ko)
        .bind(&material.name_en)
        .bind(&material.name_jp)
        .bind(&material.description)
        .bind(&material.care_tips)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;
        let material_id: String = row.try_get("id")?;
        report.materials += 1;

        for link in &material.symbols {
            let symbol_id: Option<String> =
                sqlx::query_scalar("SELECT id FROM laundry_symbols WHERE code = ?")
                    .bind(&link.code)
                    .fetch_optional(&mut *tx)
                    .await?;
            let symbol_id = symbol_id.ok_or_else(|| {
                StorageError::InvalidData(format!(
                    "material {} links unknown symbol {}",
                    material.code, link.code
                ))
            })?;

            sqlx::query(
                r#"
                INSERT INTO material_symbols (id, material_id, symbol_id, frequency, note)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(material_id, symbol_id) DO UPDATE SET
                    frequency = excluded.frequency,
                    note = excluded.note
                "#,
            )
            .bind(generate_id())
            .bind(&material_id)
            .bind(&symbol_id)
            .bind(link.frequency.as_str())
            .bind(&link.note)
            .execute(&mut *tx)
            .await?;
            report.material_symbols += 1;
        }
    }

    tx.commit().await?;

    info!(
        "Seeded catalog: {} symbols, {} translations, {} materials, {} material links",
        report.symbols, report.translations, report.materials, report.material_symbols
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_symbols_cover_every_language() {
        let symbols: Vec<SymbolSeed> = serde_json::from_str(SYMBOLS_JSON).unwrap();
        assert_eq!(symbols.len(), 22);

        for symbol in &symbols {
            let mut langs: Vec<&str> = symbol
                .translations
                .iter()
                .map(|t| t.country_code.as_str())
                .collect();
            langs.sort_unstable();
            assert_eq!(langs, vec!["en", "jp", "ko"], "symbol {}", symbol.code);
        }
    }

    #[test]
    fn test_bundled_materials_link_known_symbols() {
        let symbols: Vec<SymbolSeed> = serde_json::from_str(SYMBOLS_JSON).unwrap();
        let materials: Vec<MaterialSeed> = serde_json::from_str(MATERIALS_JSON).unwrap();

        for material in &materials {
            for link in &material.symbols {
                assert!(
                    symbols.iter().any(|s| s.code == link.code),
                    "{} links unknown {}",
                    material.code,
                    link.code
                );
            }
        }
    }
}
