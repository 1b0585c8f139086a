use strip_ansi_escapes::strip;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DATABASE_PATH: &str = "taskboard.sqlite";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Process settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub log_level: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// `BACKEND_PORT` wins over `PORT`; `DATABASE_URL` wins over
    /// `DATABASE_PATH`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("BACKEND_PORT").or_else(|| get("PORT")) {
            Some(raw) => parse_port(&raw).unwrap_or_else(|| {
                tracing::warn!("Invalid port value {raw:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| {
            let path = get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
            sqlite_url(&path)
        });

        Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url,
            log_level: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `EnvFilter` directive limiting `log_level` to the workspace crates.
    pub fn log_filter(&self) -> String {
        format!(
            "warn,server={level},db={level},db_migration={level},tower_http={level}",
            level = self.log_level
        )
    }
}

/// Creates the file on first use.
pub fn sqlite_url(path: &str) -> String {
    format!("sqlite://{path}?mode=rwc")
}

fn parse_port(raw: &str) -> Option<u16> {
    // remove any ANSI codes before parsing
    let cleaned = String::from_utf8(strip(raw.as_bytes())).ok()?;
    cleaned.trim().parse::<u16>().ok()
}
