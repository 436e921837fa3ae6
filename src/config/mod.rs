use std::env;
use std::path::PathBuf;

/// Default sheet layout of the production spreadsheets. Every value can be
/// overridden through the environment; the defaults track the sheets as
/// they are named today.
const DEFAULT_OVERALL_SHEET: &str = "全体";
const DEFAULT_REGION_SHEETS: &str = "東京=tokyo,大阪=osaka,名古屋=nagoya,企画開発=kikakukaihatsu";
const DEFAULT_MASTER_SHEET: &str = "シート1";
const DEFAULT_SELF_SHEET: &str = "フォームの回答_自己";
const DEFAULT_MANAGER_SHEET: &str = "フォームの回答_部長";
const DEFAULT_SCORE_SHEET: &str = "計算_部長";

/// Top-level configuration for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sales: SalesSheetsConfig,
    pub evaluation: EvaluationSheetsConfig,
    pub telemetry: TelemetryConfig,
    /// Optional path to the JSON grant table for the access policy.
    pub grants_path: Option<PathBuf>,
}

/// Sheet names of the sales spreadsheet: one overall tab plus one tab per
/// region, each mapped to the key the UI routes on.
#[derive(Debug, Clone)]
pub struct SalesSheetsConfig {
    pub spreadsheet_url: Option<String>,
    pub overall_sheet: String,
    pub regions: Vec<RegionSheet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSheet {
    /// Tab name as it appears in the spreadsheet.
    pub sheet: String,
    /// Stable key the UI and the access policy route on.
    pub key: String,
}

/// The four tabs of the evaluation spreadsheet.
#[derive(Debug, Clone)]
pub struct EvaluationSheetsConfig {
    pub spreadsheet_url: Option<String>,
    pub master_sheet: String,
    pub self_sheet: String,
    pub manager_sheet: String,
    pub score_sheet: String,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("EVALBOARD_REGION_SHEETS entry '{entry}' must look like '東京=tokyo'")]
    InvalidRegionEntry { entry: String },
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let regions = parse_region_sheets(
            &env::var("EVALBOARD_REGION_SHEETS")
                .unwrap_or_else(|_| DEFAULT_REGION_SHEETS.to_string()),
        )?;

        Ok(Self {
            sales: SalesSheetsConfig {
                spreadsheet_url: env::var("EVALBOARD_SALES_URL").ok(),
                overall_sheet: env::var("EVALBOARD_OVERALL_SHEET")
                    .unwrap_or_else(|_| DEFAULT_OVERALL_SHEET.to_string()),
                regions,
            },
            evaluation: EvaluationSheetsConfig {
                spreadsheet_url: env::var("EVALBOARD_EVALUATION_URL").ok(),
                master_sheet: env::var("EVALBOARD_MASTER_SHEET")
                    .unwrap_or_else(|_| DEFAULT_MASTER_SHEET.to_string()),
                self_sheet: env::var("EVALBOARD_SELF_SHEET")
                    .unwrap_or_else(|_| DEFAULT_SELF_SHEET.to_string()),
                manager_sheet: env::var("EVALBOARD_MANAGER_SHEET")
                    .unwrap_or_else(|_| DEFAULT_MANAGER_SHEET.to_string()),
                score_sheet: env::var("EVALBOARD_SCORE_SHEET")
                    .unwrap_or_else(|_| DEFAULT_SCORE_SHEET.to_string()),
            },
            telemetry: TelemetryConfig {
                log_level: env::var("EVALBOARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            grants_path: env::var("EVALBOARD_GRANTS_PATH").ok().map(PathBuf::from),
        })
    }
}

fn parse_region_sheets(raw: &str) -> Result<Vec<RegionSheet>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (sheet, key) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidRegionEntry {
                    entry: entry.to_string(),
                })?;
            let sheet = sheet.trim();
            let key = key.trim();
            if sheet.is_empty() || key.is_empty() {
                return Err(ConfigError::InvalidRegionEntry {
                    entry: entry.to_string(),
                });
            }
            Ok(RegionSheet {
                sheet: sheet.to_string(),
                key: key.to_string(),
            })
        })
        .collect()
}
