use anyhow::Context;

/// Upper bound for `JWT_TTL_MINUTES`: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 cost parameters used when hashing new passwords.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub cloudinary: CloudinaryConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("{key} must be set"))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_required("DATABASE_URL")?;

        let port = match std::env::var("APP_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("invalid port: {v}"))?,
            Err(_) => 5000,
        };

        let cors_origins = parse_origins(&env_or("CORS_ORIGINS", "http://localhost:3000"));

        let jwt = JwtConfig {
            secret: env_required("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "folio"),
            audience: env_or("JWT_AUDIENCE", "folio-users"),
            ttl_minutes: check_ttl(env_parsed("JWT_TTL_MINUTES", 120))?,
        };

        let password = PasswordConfig {
            memory_kib: env_parsed("PASSWORD_MEMORY_KIB", argon2::Params::DEFAULT_M_COST),
            iterations: env_parsed("PASSWORD_ITERATIONS", argon2::Params::DEFAULT_T_COST),
        };

        let cloudinary = CloudinaryConfig {
            cloud_name: env_required("CLOUDINARY_CLOUD_NAME")?,
            api_key: env_required("CLOUDINARY_API_KEY")?,
            api_secret: env_required("CLOUDINARY_API_SECRET")?,
            folder: env_or("CLOUDINARY_FOLDER", "profiles"),
            api_base: env_or("CLOUDINARY_API_BASE", "https://api.cloudinary.com/v1_1"),
        };

        Ok(Self {
            database_url,
            host: env_or("APP_HOST", "0.0.0.0"),
            port,
            cors_origins,
            jwt,
            password,
            cloudinary,
        })
    }
}

fn check_ttl(minutes: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        (1..=MAX_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{check_ttl, parse_origins, MAX_TTL_MINUTES};

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        assert_eq!(check_ttl(120).unwrap(), 120);
        assert_eq!(check_ttl(MAX_TTL_MINUTES).unwrap(), MAX_TTL_MINUTES);
        assert!(check_ttl(0).is_err());
        assert!(check_ttl(-5).is_err());
        assert!(check_ttl(i64::MAX).is_err());
    }

    #[test]
    fn origins_are_split_trimmed_and_normalized() {
        let origins = parse_origins(" http://localhost:3000 , https://portfolio.example.app/ ,,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://portfolio.example.app".to_string()
            ]
        );
    }
}
