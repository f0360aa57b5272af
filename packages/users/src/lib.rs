// ABOUTME: Member accounts and their linked Kakao/Google identities
// ABOUTME: SQLite-backed storage with soft deletion and encrypted provider tokens

pub mod storage;
pub mod types;

pub use storage::UserStorage;
pub use types::{CreateUserInput, LinkedAccount, ProviderTokens, UpdateUserInput, User};
