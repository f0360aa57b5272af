// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles member lookup, social account linking, soft deletion, and premium flag

use laundrylens_core::{generate_id, SocialProvider};
use laundrylens_security::TokenCipher;
use laundrylens_storage::{now_timestamp, parse_optional_timestamp, parse_timestamp, StorageError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, SqlitePool};
use tracing::{debug, warn};

use crate::types::{CreateUserInput, LinkedAccount, ProviderTokens, UpdateUserInput, User};

const USER_COLUMNS: &str =
    "u.id, u.email, u.nickname, u.profile_image, u.is_premium, u.created_at, u.updated_at, u.deleted_at";

#[derive(Clone)]
pub struct UserStorage {
    pool: SqlitePool,
    cipher: TokenCipher,
}

impl UserStorage {
    pub fn new(pool: SqlitePool, cipher: TokenCipher) -> Self {
        Self { pool, cipher }
    }

    /// Live member by id, `None` when missing or withdrawn
    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE u.id = ? AND u.deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Live member by id, `StorageError::NotFound` when missing or withdrawn
    pub async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        self.find_by_id(user_id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        debug!("Fetching user by email");

        let row = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE u.email = ? AND u.deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Member owning a provider identity, ignoring withdrawn members
    pub async fn find_by_social_account(
        &self,
        provider: SocialProvider,
        provider_id: &str,
    ) -> Result<Option<User>, StorageError> {
        debug!(
            "Fetching user by social account: {} {}",
            provider, provider_id
        );

        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM social_accounts s
            JOIN users u ON u.id = s.user_id
            WHERE s.provider = ? AND s.provider_id = ? AND u.deleted_at IS NULL
            "#,
            USER_COLUMNS
        ))
        .bind(provider.as_str())
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Create a member together with its first social account
    pub async fn create_with_social_account(
        &self,
        input: CreateUserInput,
        provider: SocialProvider,
        provider_id: &str,
        tokens: &ProviderTokens,
    ) -> Result<User, StorageError> {
        let user_id = generate_id();
        let now = now_timestamp();
        debug!("Creating user {} via {}", user_id, provider);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, nickname, profile_image, is_premium, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(&input.email)
        .bind(&input.nickname)
        .bind(&input.profile_image)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        self.insert_social_account(&mut tx, &user_id, provider, provider_id, tokens, &now)
            .await?;

        tx.commit().await?;

        self.get_user(&user_id).await
    }

    /// Attach another provider identity to an existing member
    pub async fn link_social_account(
        &self,
        user_id: &str,
        provider: SocialProvider,
        provider_id: &str,
        tokens: &ProviderTokens,
    ) -> Result<(), StorageError> {
        debug!("Linking {} account to user {}", provider, user_id);

        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        self.insert_social_account(&mut tx, user_id, provider, provider_id, tokens, &now)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    /// Store fresh provider tokens after a repeat login. A missing token keeps the stored one.
    pub async fn update_social_account_tokens(
        &self,
        provider: SocialProvider,
        provider_id: &str,
        tokens: &ProviderTokens,
    ) -> Result<(), StorageError> {
        debug!("Updating tokens for {} account {}", provider, provider_id);

        let access_token = self.seal(tokens.access_token.as_deref())?;
        let refresh_token = self.seal(tokens.refresh_token.as_deref())?;

        let result = sqlx::query(
            r#"
            UPDATE social_accounts
            SET access_token = COALESCE(?, access_token),
                refresh_token = COALESCE(?, refresh_token),
                updated_at = ?
            WHERE provider = ? AND provider_id = ?
            "#,
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(now_timestamp())
        .bind(provider.as_str())
        .bind(provider_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Provider identities attached to a member, with tokens decrypted where possible
    pub async fn list_social_accounts(
        &self,
        user_id: &str,
    ) -> Result<Vec<LinkedAccount>, StorageError> {
        debug!("Listing social accounts for user {}", user_id);

        let rows = sqlx::query(
            r#"
            SELECT provider, provider_id, access_token, refresh_token
            FROM social_accounts
            WHERE user_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<LinkedAccount, StorageError> {
                let provider: String = row.try_get("provider")?;
                let provider = provider
                    .parse::<SocialProvider>()
                    .map_err(|e| StorageError::InvalidData(e.to_string()))?;
                Ok(LinkedAccount {
                    provider,
                    provider_id: row.try_get("provider_id")?,
                    tokens: ProviderTokens {
                        access_token: self.open(row.try_get("access_token")?),
                        refresh_token: self.open(row.try_get("refresh_token")?),
                    },
                })
            })
            .collect()
    }

    /// The member's identity at one provider, if linked
    pub async fn get_social_account(
        &self,
        user_id: &str,
        provider: SocialProvider,
    ) -> Result<Option<LinkedAccount>, StorageError> {
        Ok(self
            .list_social_accounts(user_id)
            .await?
            .into_iter()
            .find(|account| account.provider == provider))
    }

    pub async fn update(&self, user_id: &str, input: UpdateUserInput) -> Result<User, StorageError> {
        debug!("Updating user: {}", user_id);

        // Column names are literals; values go through push_bind
        let mut query_builder = QueryBuilder::new("UPDATE users SET updated_at = ");
        query_builder.push_bind(now_timestamp());

        if let Some(nickname) = &input.nickname {
            query_builder.push(", nickname = ");
            query_builder.push_bind(nickname);
        }
        if let Some(profile_image) = &input.profile_image {
            query_builder.push(", profile_image = ");
            query_builder.push_bind(profile_image);
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(user_id);
        query_builder.push(" AND deleted_at IS NULL");

        let result = query_builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.get_user(user_id).await
    }

    pub async fn set_premium(&self, user_id: &str, is_premium: bool) -> Result<(), StorageError> {
        debug!("Setting premium={} for user {}", is_premium, user_id);

        sqlx::query("UPDATE users SET is_premium = ?, updated_at = ? WHERE id = ?")
            .bind(is_premium)
            .bind(now_timestamp())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark a member withdrawn. The row stays for payment and history references.
    pub async fn soft_delete(&self, user_id: &str) -> Result<(), StorageError> {
        debug!("Soft deleting user: {}", user_id);

        let now = now_timestamp();
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Drop every provider identity of a member so it can sign up again later
    pub async fn unlink_social_accounts(&self, user_id: &str) -> Result<u64, StorageError> {
        debug!("Unlinking social accounts for user {}", user_id);

        let result = sqlx::query("DELETE FROM social_accounts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Unlink all provider identities and soft delete the member in one transaction
    pub async fn withdraw(&self, user_id: &str) -> Result<(), StorageError> {
        debug!("Withdrawing user: {}", user_id);

        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, is_premium = 0, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        sqlx::query("DELETE FROM social_accounts WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn insert_social_account(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user_id: &str,
        provider: SocialProvider,
        provider_id: &str,
        tokens: &ProviderTokens,
        now: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO social_accounts
                (id, user_id, provider, provider_id, access_token, refresh_token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_id())
        .bind(user_id)
        .bind(provider.as_str())
        .bind(provider_id)
        .bind(self.seal(tokens.access_token.as_deref())?)
        .bind(self.seal(tokens.refresh_token.as_deref())?)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    fn seal(&self, token: Option<&str>) -> Result<Option<String>, StorageError> {
        self.cipher
            .encrypt_opt(token)
            .map_err(|e| StorageError::Encryption(format!("Failed to encrypt token: {}", e)))
    }

    fn open(&self, sealed: Option<String>) -> Option<String> {
        let sealed = sealed?;
        match self.cipher.decrypt(&sealed) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Stored provider token could not be decrypted: {}", e);
                None
            }
        }
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        nickname: row.try_get("nickname")?,
        profile_image: row.try_get("profile_image")?,
        is_premium: row.try_get::<bool, _>("is_premium")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        deleted_at: parse_optional_timestamp(row.try_get("deleted_at")?)?,
    })
}
