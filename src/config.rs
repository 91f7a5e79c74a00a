use crate::model::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// One geographic search the pipeline runs per cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionProfile {
    pub label: String,
    pub region: u32,
    pub sections: Vec<u32>,
}

/// Search parameters shared by every region profile. These map onto the
/// 591 list-page query string; dimensions the site cannot filter on
/// (elevator vs. floor, open-plan layouts, exact minimum size) are
/// re-checked client-side by the selector.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    /// Property kind (1 = whole-unit home).
    pub kind: u32,
    /// Acceptable room counts.
    pub layouts: Vec<u32>,
    /// Monthly rent ceiling.
    pub max_price: u32,
    /// Size range in ping.
    pub min_area: u32,
    pub max_area: u32,
    /// Required equipment tags (air conditioner, washer, fridge).
    pub options: Vec<String>,
    /// Other constraints (no rooftop add-on, near MRT, cooking allowed).
    pub extras: Vec<String>,
    /// Sort field and direction requested from the site.
    pub order: String,
    pub order_type: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            kind: 1,
            layouts: vec![2, 3, 4],
            max_price: 30000,
            min_area: 10,
            max_area: 50,
            options: ["cold", "washer", "icebox"].map(String::from).to_vec(),
            extras: ["not_cover", "near_subway", "cook"].map(String::from).to_vec(),
            order: "posttime".to_string(),
            order_type: "desc".to_string(),
        }
    }
}

/// Which source interface to speak. The site has alternated between a
/// JSON list API and server-rendered pages; both remain supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Ssr,
    Api,
}

#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    /// Delivery degrades to log-only when either credential is absent.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_profiles")]
    pub profiles: Vec<RegionProfile>,
    #[serde(default)]
    pub filter: SearchFilter,
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default = "default_seen_file")]
    pub seen_file: PathBuf,
    #[serde(default = "default_pending_file")]
    pub pending_file: PathBuf,
    #[serde(skip)]
    pub telegram: TelegramConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            filter: SearchFilter::default(),
            transport: TransportKind::default(),
            seen_file: default_seen_file(),
            pending_file: default_pending_file(),
            telegram: TelegramConfig::default(),
        }
    }
}

fn default_seen_file() -> PathBuf {
    PathBuf::from("seen_ids.json")
}

fn default_pending_file() -> PathBuf {
    PathBuf::from("pending_listings.json")
}

/// Taipei City minus Neihu/Beitou, plus Yonghe and Sanchong in New Taipei.
fn default_profiles() -> Vec<RegionProfile> {
    vec![
        RegionProfile {
            label: "台北市（排除內湖/北投）".to_string(),
            region: 1,
            sections: vec![1, 2, 3, 4, 5, 6, 7, 8, 11, 12],
        },
        RegionProfile {
            label: "新北永和區".to_string(),
            region: 3,
            sections: vec![37],
        },
        RegionProfile {
            label: "新北三重區".to_string(),
            region: 3,
            sections: vec![43],
        },
    ]
}

/// Loads configuration from a JSON file, falling back to the built-in
/// profiles when the file does not exist. Telegram credentials always come
/// from the environment so they stay out of the config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let mut config = if path.as_ref().exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        AppConfig::default()
    };

    config.telegram = TelegramConfig {
        bot_token: env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
        chat_id: env::var("TELEGRAM_CHAT_ID").unwrap_or_default(),
    };

    Ok(config)
}
