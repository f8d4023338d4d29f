//! Download model sheets from Google Sheets as TSV

use crate::error::{Result, SchemaError};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const GSHEET_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// `{gsheet_id, sheets: [{gid, name?}]}` file passed to `schema2model --gsheet`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GsheetConfig {
    pub gsheet_id: String,
    pub sheets: Vec<SheetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetRef {
    #[serde(deserialize_with = "scalar_string")]
    pub gid: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl SheetRef {
    /// File stem of the downloaded sheet, the gid when unnamed
    pub fn file_stem(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.gid)
    }
}

fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "Each sheet has to have gid, got {:?}",
            other
        ))),
    }
}

impl GsheetConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// `./google_sheet_<id>`
    pub fn default_download_dir(&self) -> PathBuf {
        PathBuf::from(".").join(format!("google_sheet_{}", self.gsheet_id))
    }
}

pub fn export_url(base_url: &str, gsheet_id: &str, gid: &str) -> String {
    format!(
        "{}/{}/export?format=tsv&gid={}",
        base_url.trim_end_matches('/'),
        gsheet_id,
        gid
    )
}

/// Download every sheet into `download_dir` as `<name>.tsv`
pub async fn download_gsheets(
    base_url: &str,
    config: &GsheetConfig,
    download_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(download_dir).map_err(|e| SchemaError::io(download_dir, e))?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()?;

    let mut downloaded = Vec::with_capacity(config.sheets.len());
    for sheet in &config.sheets {
        let url = export_url(base_url, &config.gsheet_id, &sheet.gid);
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SchemaError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        let body = response.bytes().await?;

        let path = download_dir.join(format!("{}.tsv", sheet.file_stem()));
        std::fs::write(&path, &body).map_err(|e| SchemaError::io(&path, e))?;
        info!(gid = %sheet.gid, path = %path.display(), "Downloaded sheet");
        downloaded.push(path);
    }
    Ok(downloaded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_config_accepts_numeric_gids() {
        let config: GsheetConfig =
            serde_yaml::from_str("gsheet_id: abc\nsheets:\n  - gid: 0\n    name: classes\n  - gid: '123'\n")
                .unwrap();
        assert_eq!(config.sheets[0].gid, "0");
        assert_eq!(config.sheets[0].file_stem(), "classes");
        assert_eq!(config.sheets[1].file_stem(), "123");
        assert_eq!(
            config.default_download_dir(),
            PathBuf::from(".").join("google_sheet_abc")
        );
    }

    #[test]
    fn test_config_requires_gid() {
        assert!(serde_yaml::from_str::<GsheetConfig>("gsheet_id: abc\nsheets:\n  - name: x\n").is_err());
    }

    #[test]
    fn test_export_url() {
        assert_eq!(
            export_url(GSHEET_BASE_URL, "abc", "42"),
            "https://docs.google.com/spreadsheets/d/abc/export?format=tsv&gid=42"
        );
    }

    #[tokio::test]
    async fn test_download_gsheets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abc/export"))
            .and(query_param("format", "tsv"))
            .and(query_param("gid", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Class Name\n> class\n"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = GsheetConfig {
            gsheet_id: "abc".to_string(),
            sheets: vec![SheetRef {
                gid: "7".to_string(),
                name: Some("classes".to_string()),
            }],
        };
        let files = download_gsheets(&server.uri(), &config, dir.path()).await.unwrap();
        assert_eq!(files, vec![dir.path().join("classes.tsv")]);
        assert_eq!(
            std::fs::read_to_string(&files[0]).unwrap(),
            "Class Name\n> class\n"
        );
    }

    #[tokio::test]
    async fn test_download_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = GsheetConfig {
            gsheet_id: "abc".to_string(),
            sheets: vec![SheetRef {
                gid: "1".to_string(),
                name: None,
            }],
        };
        let err = download_gsheets(&server.uri(), &config, dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("status code: 403"));
    }
}
