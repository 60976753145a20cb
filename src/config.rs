use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model name and credential for one upstream profile.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub api_key: Option<String>,
    /// Name of the variable that should hold the key, used in error messages.
    pub key_var: &'static str,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub server_port: u16,
    pub upstream_base_url: String,
    pub upstream_timeout: Duration,
    pub max_body_bytes: usize,
    pub chat: ModelSettings,
    pub build: ModelSettings,
    pub image: ModelSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            server_port: 5000,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(120),
            max_body_bytes: 32 * 1024 * 1024,
            chat: ModelSettings {
                model: "gemini-2.0-flash".to_string(),
                api_key: None,
                key_var: "GEMINI_CHAT_API_KEY",
            },
            build: ModelSettings {
                model: "gemini-2.0-flash".to_string(),
                api_key: None,
                key_var: "GEMINI_BUILD_API_KEY",
            },
            image: ModelSettings {
                model: "gemini-2.0-flash-exp-image-generation".to_string(),
                api_key: None,
                key_var: "GEMINI_IMAGE_API_KEY",
            },
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source. Blank values count as unset.
    ///
    /// Per-profile keys fall back to the shared `GOOGLE_API_KEY`, so a single
    /// key deployment and a per-mode key deployment use the same loader.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(value) = get("PORT") {
            match value.parse::<u16>() {
                Ok(port) => config.server_port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value: {}", value),
            }
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            config.upstream_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(value) = get("UPSTREAM_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => config.upstream_timeout = Duration::from_secs(secs),
                Err(_) => log::warn!("Ignoring invalid UPSTREAM_TIMEOUT_SECS value: {}", value),
            }
        }
        if let Some(value) = get("MAX_BODY_MB") {
            match value.parse::<usize>() {
                Ok(mb) => config.max_body_bytes = mb * 1024 * 1024,
                Err(_) => log::warn!("Ignoring invalid MAX_BODY_MB value: {}", value),
            }
        }

        let shared_key = get("GOOGLE_API_KEY");
        for (settings, model_var) in [
            (&mut config.chat, "GEMINI_CHAT_MODEL"),
            (&mut config.build, "GEMINI_BUILD_MODEL"),
            (&mut config.image, "GEMINI_IMAGE_MODEL"),
        ] {
            if let Some(model) = get(model_var) {
                settings.model = model;
            }
            settings.api_key = get(settings.key_var).or_else(|| shared_key.clone());
        }

        config
    }

    /// True once the chat profile can reach the upstream.
    pub fn is_ready(&self) -> bool {
        self.chat.api_key.is_some()
    }
}
