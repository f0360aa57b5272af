// ABOUTME: Material lookups exposed to the HTTP layer
// ABOUTME: Validates search terms and assembles material details with linked symbols

use laundrylens_core::constants::MATERIAL_SEARCH_MAX_LEN;

use super::storage::MaterialStorage;
use super::types::{Material, MaterialDetail, MaterialList};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct MaterialService {
    storage: MaterialStorage,
}

impl MaterialService {
    pub fn new(storage: MaterialStorage) -> Self {
        Self { storage }
    }

    /// Every material, or those whose names or code contain `search`
    pub async fn find_all(&self, search: Option<&str>) -> CatalogResult<MaterialList> {
        let term = match search.map(str::trim) {
            Some(term) if term.chars().count() > MATERIAL_SEARCH_MAX_LEN => {
                return Err(CatalogError::InvalidQuery(format!(
                    "search must be at most {} characters",
                    MATERIAL_SEARCH_MAX_LEN
                )));
            }
            Some("") | None => None,
            Some(term) => Some(term),
        };

        let materials = self.storage.list(term).await?;
        Ok(MaterialList {
            total: materials.len(),
            materials,
        })
    }

    pub async fn search(&self, query: &str) -> CatalogResult<MaterialList> {
        self.find_all(Some(query)).await
    }

    pub async fn find_by_id(&self, id: &str) -> CatalogResult<MaterialDetail> {
        let material = self
            .storage
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::MaterialNotFound)?;
        self.detail(material).await
    }

    pub async fn find_by_code(&self, code: &str) -> CatalogResult<MaterialDetail> {
        let material = self
            .storage
            .find_by_code(&code.trim().to_uppercase())
            .await?
            .ok_or(CatalogError::MaterialNotFound)?;
        self.detail(material).await
    }

    async fn detail(&self, material: Material) -> CatalogResult<MaterialDetail> {
        let symbols = self.storage.symbols_for(&material.id).await?;
        Ok(MaterialDetail { material, symbols })
    }
}
