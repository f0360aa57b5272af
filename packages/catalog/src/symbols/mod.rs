pub mod service;
pub mod storage;
pub mod types;

pub use service::SymbolService;
pub use storage::SymbolStorage;
pub use types::{Country, CountryList, LaundrySymbol, SymbolDetail, SymbolList, SymbolTranslation};
