use crate::diagnostics::{FileSink, NullSink, TelemetrySink};
use crate::error::WaveError;
use crate::fetch::{Fetcher, Source};
use crate::summarize::{GeminiGenerator, SummarizeFlow, TextGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// The two data sources the board can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Local,
    Remote,
}

impl DataSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }

    /// The other source.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown data source '{other}': expected local|remote")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub summarize: SummarizeConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub default: DataSource,
    #[serde(default = "default_local_source")]
    pub local: String,
    #[serde(default = "default_remote_source")]
    pub remote: String,
    /// Optional comments document loaded alongside the posts.
    #[serde(default)]
    pub comments: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            default: DataSource::default(),
            local: default_local_source(),
            remote: default_remote_source(),
            comments: String::new(),
        }
    }
}

impl SourcesConfig {
    /// Source string configured for `kind`.
    #[must_use]
    pub fn raw(&self, kind: DataSource) -> &str {
        match kind {
            DataSource::Local => &self.local,
            DataSource::Remote => &self.remote,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_summarize_timeout")]
    pub timeout_secs: u64,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_summarize_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_diagnostics_dir")]
    pub dir: PathBuf,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_diagnostics_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Display name attached to comments added locally.
    #[serde(default = "default_author")]
    pub author: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
        }
    }
}

/// Fully resolved configuration plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub config: WaveConfig,
    pub project_root: PathBuf,
    pub project_path: PathBuf,
    pub user_path: Option<PathBuf>,
}

impl EffectiveConfig {
    /// Resolve the configured source for `kind`, relative paths anchored at the project root.
    #[must_use]
    pub fn source(&self, kind: DataSource) -> Source {
        Source::parse(self.config.sources.raw(kind)).resolve(&self.project_root)
    }

    /// Resolve a `--source` selector: `local`, `remote`, or a literal path/URL.
    #[must_use]
    pub fn select_source(&self, selector: Option<&str>) -> (Option<DataSource>, Source) {
        let Some(raw) = selector else {
            let kind = self.config.sources.default;
            return (Some(kind), self.source(kind));
        };
        match raw.parse::<DataSource>() {
            Ok(kind) => (Some(kind), self.source(kind)),
            Err(_) => (None, Source::parse(raw).resolve(&self.project_root)),
        }
    }

    /// The configured comments document, if any.
    #[must_use]
    pub fn comments_source(&self) -> Option<Source> {
        let raw = self.config.sources.comments.trim();
        (!raw.is_empty()).then(|| Source::parse(raw).resolve(&self.project_root))
    }

    #[must_use]
    pub fn fetcher(&self) -> Fetcher {
        Fetcher::new(Duration::from_secs(self.config.fetch.timeout_secs))
    }

    /// Build the summarization flow for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::Config`] for an unknown provider.
    pub fn summarize_flow(&self) -> Result<SummarizeFlow, WaveError> {
        let cfg = &self.config.summarize;
        let generator: Arc<dyn TextGenerator> = match cfg.provider.as_str() {
            "gemini" | "googleai" => Arc::new(GeminiGenerator::new(
                cfg.endpoint.clone(),
                cfg.model.clone(),
                std::env::var(&cfg.api_key_env).ok(),
                Duration::from_secs(cfg.timeout_secs),
            )),
            other => {
                return Err(WaveError::Config {
                    path: self.project_path.display().to_string(),
                    message: format!("unknown summarize.provider '{other}': expected gemini"),
                });
            }
        };
        Ok(SummarizeFlow::new(generator))
    }

    /// Diagnostic sink honoring `diagnostics.enabled`.
    #[must_use]
    pub fn telemetry_sink(&self) -> Arc<dyn TelemetrySink> {
        if self.config.diagnostics.enabled {
            let dir = &self.config.diagnostics.dir;
            let dir = if dir.is_relative() {
                self.project_root.join(dir)
            } else {
                dir.clone()
            };
            Arc::new(FileSink::new(dir))
        } else {
            Arc::new(NullSink)
        }
    }
}

#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".wave/config.toml")
}

#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wave/config.toml"))
}

/// Read a config file as a raw TOML table. A missing file is an empty table.
///
/// # Errors
///
/// Returns [`WaveError::Config`] when the file exists but cannot be read or parsed.
pub fn load_toml_table(path: &Path) -> Result<toml::Table, WaveError> {
    if !path.exists() {
        return Ok(toml::Table::new());
    }
    let content = std::fs::read_to_string(path).map_err(|err| WaveError::Config {
        path: path.display().to_string(),
        message: format!("failed to read: {err}"),
    })?;
    toml::from_str::<toml::Table>(&content).map_err(|err| WaveError::Config {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Overlay `top` onto `base`, merging nested tables key by key.
fn merge_tables(base: &mut toml::Table, top: toml::Table) {
    for (key, value) in top {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Build a config from user and project tables; project values win.
///
/// # Errors
///
/// Returns [`WaveError::Config`] when the merged table has wrongly typed values.
pub fn config_from_tables(
    user: toml::Table,
    project: toml::Table,
    origin: &Path,
) -> Result<WaveConfig, WaveError> {
    let mut merged = user;
    merge_tables(&mut merged, project);
    toml::Value::Table(merged)
        .try_into::<WaveConfig>()
        .map_err(|err| WaveError::Config {
            path: origin.display().to_string(),
            message: err.to_string(),
        })
}

/// Load and merge the user and project config files for `project_root`.
///
/// # Errors
///
/// Returns [`WaveError::Config`] when either file is unreadable or invalid.
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig, WaveError> {
    let project_path = project_config_path(project_root);
    let user_path = user_config_path();

    let user = match &user_path {
        Some(path) => load_toml_table(path)?,
        None => toml::Table::new(),
    };
    let project = load_toml_table(&project_path)?;
    let config = config_from_tables(user, project, &project_path)?;

    Ok(EffectiveConfig {
        config,
        project_root: project_root.to_path_buf(),
        project_path,
        user_path,
    })
}

const fn default_true() -> bool {
    true
}

fn default_local_source() -> String {
    "data/wave-data.json".to_string()
}

fn default_remote_source() -> String {
    "https://example.com/wave-data.json".to_string()
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_GENAI_API_KEY".to_string()
}

const fn default_summarize_timeout() -> u64 {
    60
}

const fn default_fetch_timeout() -> u64 {
    30
}

fn default_diagnostics_dir() -> PathBuf {
    PathBuf::from(".wave/diagnostics")
}

fn default_author() -> String {
    "CurrentUser".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(text: &str) -> toml::Table {
        toml::from_str::<toml::Table>(text).expect("valid toml")
    }

    fn effective(config: WaveConfig, root: &Path) -> EffectiveConfig {
        EffectiveConfig {
            config,
            project_root: root.to_path_buf(),
            project_path: project_config_path(root),
            user_path: None,
        }
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = TempDir::new().expect("tempdir");
        let project = load_toml_table(&project_config_path(root.path())).expect("missing is ok");
        let cfg = config_from_tables(toml::Table::new(), project, root.path()).expect("defaults");
        assert_eq!(cfg.sources.default, DataSource::Local);
        assert_eq!(cfg.sources.local, "data/wave-data.json");
        assert_eq!(cfg.summarize.model, "gemini-2.0-flash");
        assert_eq!(cfg.summarize.api_key_env, "GOOGLE_GENAI_API_KEY");
        assert!(cfg.diagnostics.enabled);
        assert_eq!(cfg.ui.author, "CurrentUser");
    }

    #[test]
    fn project_values_override_user_values_per_key() {
        let user = table(
            r#"
[sources]
remote = "https://user.example/posts.json"
local = "user.json"

[ui]
author = "Ann"
"#,
        );
        let project = table(
            r#"
[sources]
local = "project.json"
"#,
        );
        let cfg = config_from_tables(user, project, Path::new(".")).expect("merge");
        assert_eq!(cfg.sources.local, "project.json");
        assert_eq!(cfg.sources.remote, "https://user.example/posts.json");
        assert_eq!(cfg.ui.author, "Ann");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let root = TempDir::new().expect("tempdir");
        let path = project_config_path(root.path());
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "[sources\nlocal = ").expect("write");
        let err = load_toml_table(&path).expect_err("broken toml");
        assert!(matches!(err, WaveError::Config { .. }));
    }

    #[test]
    fn wrong_value_type_is_config_error() {
        let err = config_from_tables(
            toml::Table::new(),
            table("[fetch]\ntimeout_secs = \"soon\""),
            Path::new("cfg.toml"),
        )
        .expect_err("string timeout");
        assert!(err.to_string().contains("cfg.toml"));
    }

    #[test]
    fn select_source_accepts_kinds_and_literals() {
        let root = Path::new("/srv/wave");
        let eff = effective(WaveConfig::default(), root);

        let (kind, source) = eff.select_source(None);
        assert_eq!(kind, Some(DataSource::Local));
        assert_eq!(source, Source::Path(root.join("data/wave-data.json")));

        let (kind, source) = eff.select_source(Some("remote"));
        assert_eq!(kind, Some(DataSource::Remote));
        assert_eq!(source, Source::Url("https://example.com/wave-data.json".into()));

        let (kind, source) = eff.select_source(Some("other/posts.json"));
        assert_eq!(kind, None);
        assert_eq!(source, Source::Path(root.join("other/posts.json")));
    }

    #[test]
    fn comments_source_is_optional() {
        let root = Path::new("/srv/wave");
        let mut cfg = WaveConfig::default();
        assert!(effective(cfg.clone(), root).comments_source().is_none());
        cfg.sources.comments = "data/comments.json".into();
        assert_eq!(
            effective(cfg, root).comments_source(),
            Some(Source::Path(root.join("data/comments.json")))
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut cfg = WaveConfig::default();
        cfg.summarize.provider = "mystery".into();
        let err = effective(cfg, Path::new("/tmp")).summarize_flow().expect_err("provider");
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn data_source_toggles_and_parses() {
        assert_eq!(DataSource::Local.toggled(), DataSource::Remote);
        assert_eq!(DataSource::Remote.toggled(), DataSource::Local);
        assert_eq!(" Remote ".parse::<DataSource>(), Ok(DataSource::Remote));
        assert!("elsewhere".parse::<DataSource>().is_err());
    }
}
