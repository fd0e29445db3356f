use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// All settings come from one JSON file with kebab-case keys. Every field
/// has a default so a minimal file only needs the OAuth client values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub(crate) struct Config {
    pub(crate) token_file_location: String,

    // OAuth client
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) scopes: Vec<String>,
    pub(crate) auth_url: String,
    pub(crate) token_url: String,
    pub(crate) redirect_url: String,

    // Library and local tree
    pub(crate) cache_file: String,
    pub(crate) free_before_date: String,
    pub(crate) root_pictures_dir: String,
    pub(crate) picture_path_substrings_to_ignore: Vec<String>,
    pub(crate) file_names_to_ignore: Vec<String>,
    pub(crate) folder_deny_patterns: Vec<String>,
    pub(crate) folder_allow_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            token_file_location: "config/token.json".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: vec!["https://www.googleapis.com/auth/photoslibrary".to_string()],
            auth_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            redirect_url: "http://localhost:8080/oauth/callback".to_string(),
            cache_file: "cache/allMediaItems.json".to_string(),
            free_before_date: String::new(),
            root_pictures_dir: String::new(),
            picture_path_substrings_to_ignore: vec![],
            file_names_to_ignore: vec![],
            folder_deny_patterns: vec![
                ".*[pP]ictures [fF]rom .*$".to_string(),
                ".*[pP]hotos [fF]rom .*$".to_string(),
                "^Wendy$".to_string(),
            ],
            folder_allow_patterns: vec!["^Photos from Michael$".to_string()],
        }
    }
}

impl Config {
    pub(crate) fn load(path: &str) -> Result<Config> {
        let p = Path::new(path);
        let f = File::open(p).with_context(|| format!("Unable to open config file {p:?}"))?;
        let cfg: Config = serde_json::from_reader(f)
            .with_context(|| format!("Unable to parse config file {p:?}"))?;
        Ok(cfg)
    }
}
