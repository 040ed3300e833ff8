use anyhow::Context;

pub const DEFAULT_HOST: &str = "http://localhost:8000";

/// Number of replies shown under a collapsed thread
pub const REPLY_PREVIEW: usize = 2;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Base url of the recipe API, without the `/api` suffix
    pub host: String,
    pub reply_preview: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            host: String::from(DEFAULT_HOST),
            reply_preview: REPLY_PREVIEW,
        }
    }
}

impl Config {
    /// Reads `POTLUCK_HOST` and `POTLUCK_REPLY_PREVIEW`, keeping defaults for unset variables
    pub fn from_env() -> anyhow::Result<Config> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let mut config = Config::default();
        if let Some(host) = var("POTLUCK_HOST") {
            config.host = host.trim_end_matches('/').to_string();
        }
        if let Some(preview) = var("POTLUCK_REPLY_PREVIEW") {
            config.reply_preview = preview
                .parse()
                .with_context(|| format!("parsing POTLUCK_REPLY_PREVIEW {preview:?}"))?;
        }
        Ok(config)
    }
}
