use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_addr: String,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub ocr_languages: String,
    pub ocr_psm: u32,
    pub ocr_invert_retry: bool,
    pub analysis: AnalysisSettings,
    pub inpaint: InpaintSettings,
}

/// Tuning for the two-means color separation of a detected region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub attempts: u32,
    pub max_iterations: u32,
    pub epsilon: f32,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InpaintSettings {
    pub radius: u32,
    pub padding: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            attempts: 10,
            max_iterations: 10,
            epsilon: 1.0,
            seed: 0x5eed,
        }
    }
}

impl Default for InpaintSettings {
    fn default() -> Self {
        Self {
            radius: 3,
            padding: 2,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 120,
            max_upload_bytes: 32 * 1024 * 1024,
            ocr_languages: "eng".to_string(),
            ocr_psm: 11,
            ocr_invert_retry: true,
            analysis: AnalysisSettings::default(),
            inpaint: InpaintSettings::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSettings>,
    ocr: Option<OcrSettings>,
    analysis: Option<AnalysisFileSettings>,
    inpaint: Option<InpaintFileSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
    request_timeout_secs: Option<u64>,
    max_upload_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSettings {
    languages: Option<String>,
    psm: Option<u32>,
    invert_retry: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisFileSettings {
    attempts: Option<u32>,
    max_iterations: Option<u32>,
    epsilon: Option<f32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct InpaintFileSettings {
    radius: Option<u32>,
    padding: Option<u32>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn merge_str(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed);
        Ok(())
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(addr) = server.addr {
                if !addr.trim().is_empty() {
                    self.server_addr = addr.trim().to_string();
                }
            }
            if let Some(secs) = server.request_timeout_secs {
                if secs > 0 {
                    self.request_timeout_secs = secs;
                }
            }
            if let Some(limit) = server.max_upload_bytes {
                if limit > 0 {
                    self.max_upload_bytes = limit;
                }
            }
        }
        if let Some(ocr) = incoming.ocr {
            if let Some(languages) = ocr.languages {
                if !languages.trim().is_empty() {
                    self.ocr_languages = languages.trim().to_string();
                }
            }
            if let Some(psm) = ocr.psm {
                self.ocr_psm = psm;
            }
            if let Some(invert) = ocr.invert_retry {
                self.ocr_invert_retry = invert;
            }
        }
        if let Some(analysis) = incoming.analysis {
            if let Some(attempts) = analysis.attempts {
                if attempts > 0 {
                    self.analysis.attempts = attempts;
                }
            }
            if let Some(iterations) = analysis.max_iterations {
                if iterations > 0 {
                    self.analysis.max_iterations = iterations;
                }
            }
            if let Some(epsilon) = analysis.epsilon {
                if epsilon.is_finite() && epsilon >= 0.0 {
                    self.analysis.epsilon = epsilon;
                }
            }
            if let Some(seed) = analysis.seed {
                self.analysis.seed = seed;
            }
        }
        if let Some(inpaint) = incoming.inpaint {
            if let Some(radius) = inpaint.radius {
                if radius > 0 {
                    self.inpaint.radius = radius;
                }
            }
            if let Some(padding) = inpaint.padding {
                self.inpaint.padding = padding;
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".photext"))
        }
    })
}
