pub mod service;
pub mod storage;
pub mod types;

pub use service::MaterialService;
pub use storage::MaterialStorage;
pub use types::{Material, MaterialDetail, MaterialList, MaterialSymbol};
