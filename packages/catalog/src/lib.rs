// ABOUTME: Reference catalog of laundry care symbols and textile materials
// ABOUTME: Localized symbol texts, material search, and idempotent seeding of bundled data

pub mod error;
pub mod materials;
pub mod seed;
pub mod symbols;

pub use error::{CatalogError, CatalogResult};
pub use materials::{
    Material, MaterialDetail, MaterialList, MaterialService, MaterialStorage, MaterialSymbol,
};
pub use seed::{seed_catalog, SeedReport};
pub use symbols::{
    Country, CountryList, LaundrySymbol, SymbolDetail, SymbolList, SymbolService, SymbolStorage,
    SymbolTranslation,
};
