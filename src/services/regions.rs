use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{
    configuration::RegionApiSettings,
    domain::region::{Municipality, State},
};

/// Client for the administrative-region lookup service. Every listing is
/// returned sorted by name; lookup failures are logged and degrade to an
/// empty list, which callers must read as "unavailable".
pub struct RegionDirectory {
    client: Client,
    base_url: Url,
    timeout: Duration,
    bulk_timeout: Duration,
}

impl RegionDirectory {
    pub fn new(settings: &RegionApiSettings) -> anyhow::Result<Self> {
        // A trailing slash keeps Url::join from eating the last path segment.
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(RegionDirectory {
            client: Client::new(),
            base_url: Url::parse(&base)?,
            timeout: Duration::from_secs(settings.timeout_secs),
            bulk_timeout: Duration::from_secs(settings.bulk_timeout_secs),
        })
    }

    pub async fn list_states(&self) -> Vec<State> {
        match self.fetch::<State>("estados", self.timeout).await {
            Ok(mut states) => {
                states.sort_by(|a, b| a.nome.cmp(&b.nome));
                states
            }
            Err(e) => {
                log::error!("Failed to fetch states: {:?}", e);
                vec![]
            }
        }
    }

    pub async fn list_municipalities(&self, uf: &str) -> Vec<Municipality> {
        let path = format!("estados/{}/municipios", uf);
        match self.fetch::<Municipality>(&path, self.timeout).await {
            Ok(mut municipalities) => {
                municipalities.sort_by(|a, b| a.nome.cmp(&b.nome));
                municipalities
            }
            Err(e) => {
                log::error!("Failed to fetch municipalities for state {}: {:?}", uf, e);
                vec![]
            }
        }
    }

    pub async fn list_all_municipalities(&self) -> Vec<Municipality> {
        match self
            .fetch::<Municipality>("municipios", self.bulk_timeout)
            .await
        {
            Ok(mut municipalities) => {
                municipalities.sort_by(|a, b| a.nome.cmp(&b.nome));
                municipalities
            }
            Err(e) => {
                log::error!("Failed to fetch the full municipality list: {:?}", e);
                vec![]
            }
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> anyhow::Result<Vec<T>> {
        let url = self.base_url.join(path)?;
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(base_url: String) -> RegionDirectory {
        RegionDirectory::new(&RegionApiSettings {
            base_url,
            timeout_secs: 5,
            bulk_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn states_are_sorted_by_name() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/estados")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id":35,"sigla":"SP","nome":"São Paulo"},
                    {"id":31,"sigla":"MG","nome":"Minas Gerais"},
                    {"id":41,"sigla":"PR","nome":"Paraná"}
                ]"#,
            )
            .create_async()
            .await;

        let states = directory(server.url()).list_states().await;

        let names: Vec<&str> = states.iter().map(|s| s.nome.as_str()).collect();
        assert_eq!(names, vec!["Minas Gerais", "Paraná", "São Paulo"]);
        for pair in states.windows(2) {
            assert!(pair[0].nome <= pair[1].nome);
        }
    }

    #[tokio::test]
    async fn server_error_yields_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/estados")
            .with_status(500)
            .create_async()
            .await;

        let states = directory(server.url()).list_states().await;

        assert!(states.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_yields_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/municipios")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let municipalities = directory(server.url()).list_all_municipalities().await;

        assert!(municipalities.is_empty());
    }

    #[tokio::test]
    async fn municipalities_are_scoped_by_state_and_sorted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/estados/PR/municipios")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id":4113700,"nome":"Londrina"},
                    {"id":4103708,"nome":"Cambé"},
                    {"id":4101408,"nome":"Apucarana"}
                ]"#,
            )
            .create_async()
            .await;

        let municipalities = directory(server.url()).list_municipalities("PR").await;

        let names: Vec<&str> = municipalities.iter().map(|m| m.nome.as_str()).collect();
        assert_eq!(names, vec!["Apucarana", "Cambé", "Londrina"]);
    }
}
