use std::time::Duration;

use serde_json::json;
use thirtyfour::{
    error::WebDriverResult, extensions::query::ElementQueryable, By, ChromiumLikeCapabilities,
    DesiredCapabilities, Key, WebDriver, WebElement,
};

use crate::{
    configuration::WebDriverSettings,
    domain::record::{BusinessRecord, SearchTarget},
    services::{extractor, PacingPolicy},
};

const MAPS_URL: &str = "https://www.google.com/maps";
const SEARCH_BOX_ID: &str = "searchboxinput";
const RESULT_LINK_SELECTOR: &str = "a.hfpxzc";

/// One browser session, good for exactly one search target.
pub trait ScrapeSession {
    async fn scrape_target(&mut self, target: &SearchTarget) -> Vec<BusinessRecord>;
    async fn close(&mut self);
}

pub trait SessionFactory {
    type Session: ScrapeSession;

    async fn open(&self) -> anyhow::Result<Self::Session>;
}

pub struct MapsSession {
    driver: Option<WebDriver>,
    pacing: PacingPolicy,
    element_wait: Duration,
}

impl MapsSession {
    /// Launches a session with the automation fingerprint dialed down and the
    /// map application already loaded.
    pub async fn open(settings: &WebDriverSettings, pacing: PacingPolicy) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.add_arg("--headless")?;
        }
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_experimental_option("excludeSwitches", json!(["enable-automation"]))?;
        caps.add_experimental_option("useAutomationExtension", json!(false))?;

        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(|| fake_user_agent::get_chrome_rua().to_string());
        caps.add_arg(&format!("user-agent={}", user_agent))?;

        let driver = WebDriver::new(settings.url.as_str(), caps).await?;
        driver.maximize_window().await?;
        driver.goto(MAPS_URL).await?;
        pacing.wait(pacing.page_load).await;

        Ok(MapsSession {
            driver: Some(driver),
            pacing,
            element_wait: Duration::from_secs(settings.element_wait_secs),
        })
    }

    /// Types the query into the search box and submits it. `false` means the
    /// input never showed up or the driver refused; nothing is raised.
    pub async fn search(&self, query: &str) -> bool {
        let Some(driver) = self.driver.as_ref() else {
            return false;
        };
        match self.submit_query(driver, query).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Search failed for '{}': {:?}", query, e);
                false
            }
        }
    }

    async fn submit_query(&self, driver: &WebDriver, query: &str) -> WebDriverResult<()> {
        let search_box = driver
            .query(By::Id(SEARCH_BOX_ID))
            .wait(self.element_wait, Duration::from_millis(500))
            .first()
            .await?;

        search_box.clear().await?;
        self.pacing.wait(self.pacing.typing).await;
        search_box.send_keys(query).await?;
        self.pacing.wait(self.pacing.typing).await;
        search_box.send_keys(Key::Enter + "").await?;
        self.pacing.wait(self.pacing.search_settle).await;

        Ok(())
    }

    /// Handles to every result entry in the loaded results view, in listing
    /// order. Empty on any failure.
    pub async fn list_result_handles(&self) -> Vec<WebElement> {
        let Some(driver) = self.driver.as_ref() else {
            return vec![];
        };
        self.pacing.wait(self.pacing.results_settle).await;

        match driver.find_all(By::Css(RESULT_LINK_SELECTOR)).await {
            Ok(handles) => handles,
            Err(e) => {
                log::error!("Failed to enumerate search results: {:?}", e);
                vec![]
            }
        }
    }

    async fn process_result(
        &self,
        driver: &WebDriver,
        handle: &WebElement,
    ) -> WebDriverResult<BusinessRecord> {
        handle.scroll_into_view().await?;
        self.pacing.wait(self.pacing.scroll_settle).await;

        // Direct click first; overlays intercept it often enough that a
        // scripted click is the designated second attempt.
        if let Err(e) = handle.click().await {
            log::warn!("Direct click failed, retrying via script: {:?}", e);
            driver
                .execute("arguments[0].click();", vec![handle.to_json()?])
                .await?;
        }
        self.pacing.wait(self.pacing.panel_settle).await;

        let page_source = driver.source().await?;
        Ok(extractor::extract_record(&page_source))
    }
}

impl ScrapeSession for MapsSession {
    async fn scrape_target(&mut self, target: &SearchTarget) -> Vec<BusinessRecord> {
        let query = target.query();
        log::info!("Searching: {}", query);

        if !self.search(&query).await {
            return vec![];
        }

        let handles = self.list_result_handles().await;
        if handles.is_empty() {
            log::warn!("No results found for: {}", query);
            return vec![];
        }
        log::info!("Found {} results for: {}", handles.len(), query);

        let Some(driver) = self.driver.as_ref() else {
            return vec![];
        };

        let mut records = vec![];
        for (index, handle) in handles.iter().enumerate() {
            match self.process_result(driver, handle).await {
                Ok(record) => {
                    let record = record.tag(&target.nicho, &target.cidade);
                    log::info!("[{}/{}] {}", index + 1, handles.len(), record.nome);
                    records.push(record);
                }
                Err(e) => {
                    log::error!("[{}/{}] Skipping result: {:?}", index + 1, handles.len(), e);
                }
            }
            self.pacing.wait(self.pacing.result_pause).await;
        }

        records
    }

    async fn close(&mut self) {
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.quit().await {
                log::error!("Failed to quit the webdriver session: {:?}", e);
            }
        }
    }
}

pub struct MapsSessionFactory {
    settings: WebDriverSettings,
    pacing: PacingPolicy,
}

impl MapsSessionFactory {
    pub fn new(settings: WebDriverSettings, pacing: PacingPolicy) -> Self {
        MapsSessionFactory { settings, pacing }
    }
}

impl SessionFactory for MapsSessionFactory {
    type Session = MapsSession;

    async fn open(&self) -> anyhow::Result<MapsSession> {
        MapsSession::open(&self.settings, self.pacing).await
    }
}
