/// Configuration for the API server
///
/// Resolved once at startup and shared read-only afterwards. A `.env` file is
/// honoured in development.
///
/// # Environment Variables
///
/// - `UZORG_DB_URL`: PostgreSQL connection string (required)
/// - `UZORG_JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `UZORG_HOST`: Host to bind to (default: 0.0.0.0)
/// - `UZORG_PORT`: Port to bind to (default: 8080)
/// - `UZORG_DB_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUST_LOG`: Log filter (see `main`)
///
/// # Example
///
/// ```no_run
/// use uzorg_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;

/// Minimum accepted signing secret length
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 secret. Generate with `openssl rand -hex 32`.
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Fails if a required variable is missing, a number doesn't parse, or the
    /// secret is shorter than [`MIN_SECRET_LEN`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("UZORG_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("UZORG_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("UZORG_PORT is not a valid port: {}", e))?;

        let database_url = lookup("UZORG_DB_URL")
            .ok_or_else(|| anyhow::anyhow!("UZORG_DB_URL environment variable is required"))?;

        let max_connections = lookup("UZORG_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("UZORG_DB_MAX_CONNECTIONS is not a number: {}", e))?;

        let jwt_secret = lookup("UZORG_JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("UZORG_JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "UZORG_JWT_SECRET must be at least {} characters long",
                MIN_SECRET_LEN
            );
        }

        Ok(Self {
            api: ApiConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
