use std::path::PathBuf;

use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub region_api: RegionApiSettings,
    pub webdriver: WebDriverSettings,
    pub scrape: ScrapeSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct RegionApiSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub bulk_timeout_secs: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct WebDriverSettings {
    pub url: String,
    pub headless: bool,
    pub user_agent: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub element_wait_secs: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct ScrapeSettings {
    pub output_dir: PathBuf,
    pub niches_path: PathBuf,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
