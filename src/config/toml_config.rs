use crate::core::assistant::ModelSettings;
use crate::domain::model::SearchCriteria;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Upper bound the provider accepts for a thinking budget.
const MAX_THINKING_BUDGET: u32 = 32_768;

fn env_var_regex() -> &'static Regex {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub thinking: ThinkingBudgets,
    pub search: SearchCriteria,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is not set.
    pub api_key_env: String,
    pub lead_model: String,
    pub analysis_model: String,
    pub request_timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let models = ModelSettings::default();
        Self {
            base_url: crate::adapters::gemini::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: "API_KEY".to_string(),
            lead_model: models.lead_model,
            analysis_model: models.analysis_model,
            request_timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingBudgets {
    pub competitor_analysis: u32,
    pub talking_points: u32,
    pub market_report: u32,
}

impl Default for ThinkingBudgets {
    fn default() -> Self {
        let models = ModelSettings::default();
        Self {
            competitor_analysis: models.competitor_thinking_budget,
            talking_points: models.talking_points_thinking_budget,
            market_report: models.market_report_thinking_budget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub lead_book: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lead_book: "leads.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub verbose: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| LeadError::ConfigError {
            message: format!("cannot read '{}': {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Resolve the API key from the config file or the environment.
    ///
    /// A `${VAR}` placeholder that survived substitution counts as unset.
    pub fn api_key(&self) -> Result<String> {
        let from_file = self
            .provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !env_var_regex().is_match(key));

        if let Some(key) = from_file {
            return Ok(key.to_string());
        }

        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LeadError::MissingApiKey {
                env_var: self.provider.api_key_env.clone(),
            })
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            lead_model: self.provider.lead_model.clone(),
            analysis_model: self.provider.analysis_model.clone(),
            competitor_thinking_budget: self.thinking.competitor_analysis,
            talking_points_thinking_budget: self.thinking.talking_points,
            market_report_thinking_budget: self.thinking.market_report,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_seconds)
    }

    /// 驗證配置的合理性 (搜尋條件另外在套用命令列參數後驗證)
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("provider.base_url", &self.provider.base_url)?;
        validation::validate_non_empty_string("provider.api_key_env", &self.provider.api_key_env)?;
        validation::validate_non_empty_string("provider.lead_model", &self.provider.lead_model)?;
        validation::validate_non_empty_string(
            "provider.analysis_model",
            &self.provider.analysis_model,
        )?;
        validation::validate_range(
            "provider.request_timeout_seconds",
            self.provider.request_timeout_seconds,
            1,
            3600,
        )?;

        validation::validate_range(
            "thinking.competitor_analysis",
            self.thinking.competitor_analysis,
            0,
            MAX_THINKING_BUDGET,
        )?;
        validation::validate_range(
            "thinking.talking_points",
            self.thinking.talking_points,
            0,
            MAX_THINKING_BUDGET,
        )?;
        validation::validate_range(
            "thinking.market_report",
            self.thinking.market_report,
            0,
            MAX_THINKING_BUDGET,
        )?;

        validation::validate_path("storage.lead_book", &self.storage.lead_book)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
