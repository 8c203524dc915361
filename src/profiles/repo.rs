use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Profile;

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn create_for_user(&self, user_id: Uuid) -> anyhow::Result<Profile>;
    /// First profile found for the user, if any.
    async fn find_by_user_id(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn list_all(&self) -> anyhow::Result<Vec<Profile>>;
    /// Persists name, age and biography of an existing profile.
    async fn save(&self, profile: &Profile) -> anyhow::Result<Profile>;
    async fn set_link(&self, user_id: Uuid, url: &str) -> anyhow::Result<Option<Profile>>;
    async fn delete_by_user_id(&self, user_id: Uuid) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgProfileRepo {
    db: PgPool,
}

impl PgProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    async fn create_for_user(&self, user_id: Uuid) -> anyhow::Result<Profile> {
        let p = Profile::with_defaults(user_id);
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, user_id, name, age, biography, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, age, biography, link
            "#,
        )
        .bind(p.id)
        .bind(p.user_id)
        .bind(&p.name)
        .bind(p.age)
        .bind(&p.biography)
        .bind(&p.link)
        .fetch_one(&self.db)
        .await
        .context("insert profile")?;
        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, age, biography, link
            FROM profiles
            WHERE user_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find profile by user")?;
        Ok(profile)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, name, age, biography, link
            FROM profiles
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list profiles")?;
        Ok(profiles)
    }

    async fn save(&self, profile: &Profile) -> anyhow::Result<Profile> {
        let saved = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
               SET name = $2, age = $3, biography = $4
             WHERE id = $1
            RETURNING id, user_id, name, age, biography, link
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(profile.age)
        .bind(&profile.biography)
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("save profile {}", profile.id))?;
        Ok(saved)
    }

    async fn set_link(&self, user_id: Uuid, url: &str) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
               SET link = $2
             WHERE id = (
                   SELECT id FROM profiles
                    WHERE user_id = $1
                    ORDER BY created_at ASC
                    LIMIT 1)
            RETURNING id, user_id, name, age, biography, link
            "#,
        )
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.db)
        .await
        .context("set profile link")?;
        Ok(profile)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM profiles WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete profiles by user")?;
        Ok(())
    }
}
