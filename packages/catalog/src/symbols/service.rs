// ABOUTME: Symbol lookups exposed to the HTTP layer
// ABOUTME: Normalizes the display language and maps missing symbols to not-found

use laundrylens_core::{normalize_language, SymbolCategory};
use tracing::info;

use super::storage::SymbolStorage;
use super::types::{CountryList, SymbolDetail, SymbolList};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct SymbolService {
    storage: SymbolStorage,
}

impl SymbolService {
    pub fn new(storage: SymbolStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &SymbolStorage {
        &self.storage
    }

    pub async fn find_all(&self, category: Option<SymbolCategory>) -> CatalogResult<SymbolList> {
        let symbols = self.storage.list(category).await?;
        Ok(SymbolList {
            total: symbols.len(),
            symbols,
        })
    }

    pub async fn find_by_id(&self, id: &str, lang: Option<&str>) -> CatalogResult<SymbolDetail> {
        let symbol = self
            .storage
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::SymbolNotFound)?;
        let translations = self
            .storage
            .translations(&symbol.id, &normalize_language(lang))
            .await?;

        Ok(SymbolDetail {
            symbol,
            translations,
        })
    }

    pub async fn find_by_code(&self, code: &str, lang: Option<&str>) -> CatalogResult<SymbolDetail> {
        info!("Looking up symbol code {}", code);

        let symbol = self
            .storage
            .find_by_code(&code.trim().to_uppercase())
            .await?
            .ok_or(CatalogError::SymbolNotFound)?;
        let translations = self
            .storage
            .translations(&symbol.id, &normalize_language(lang))
            .await?;

        Ok(SymbolDetail {
            symbol,
            translations,
        })
    }

    pub async fn find_by_category(
        &self,
        category: SymbolCategory,
        lang: Option<&str>,
    ) -> CatalogResult<Vec<SymbolDetail>> {
        Ok(self
            .storage
            .list_with_translations(category, &normalize_language(lang))
            .await?)
    }

    pub fn supported_countries(&self) -> CountryList {
        CountryList::supported()
    }
}
