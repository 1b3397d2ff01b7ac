use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::api_types::ApiFilmList;
use crate::catalog::locator::extract_id;
use crate::catalog::types::{Character, Film};
use crate::config::ApiConfig;

/// Read access to the remote catalog.
///
/// Implementations absorb every failure: a failed list is empty, a failed
/// lookup is `None`. Calls are independent and may run concurrently.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
  /// Fetch the full film list
  async fn list_films(&self) -> Vec<Film>;

  /// Fetch one film by locator
  async fn fetch_film(&self, locator: &str) -> Option<Film>;

  /// Fetch one character by locator
  async fn fetch_character(&self, locator: &str) -> Option<Character>;
}

/// Catalog API client over HTTP
#[derive(Clone)]
pub struct CatalogClient {
  http: reqwest::Client,
  base_url: String,
  api: ApiConfig,
}

impl CatalogClient {
  pub fn new(api: &ApiConfig) -> Result<Self> {
    Url::parse(&api.url).map_err(|e| eyre!("Invalid catalog url {}: {}", api.url, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("holocron/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: api.url.trim_end_matches('/').to_string(),
      api: api.clone(),
    })
  }

  /// Resolve an endpoint path against the base url
  fn endpoint(&self, path: &str) -> Result<Url> {
    let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
    Url::parse(&raw).map_err(|e| eyre!("Invalid endpoint {}: {}", raw, e))
  }

  /// Endpoint for an entity path template and a locator
  fn entity_endpoint(&self, template: &str, locator: &str) -> Result<Url> {
    self.endpoint(&template.replace("{id}", &extract_id(locator)))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    debug!(%url, "GET");

    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to decode response from {}: {}", url, e))
  }

  async fn try_list_films(&self) -> Result<Vec<Film>> {
    let url = self.endpoint(&self.api.films_path)?;
    let list: ApiFilmList = self.get_json(url).await?;

    debug!(
      count = list.count,
      returned = list.results.len(),
      more = list.next.is_some(),
      "film list received"
    );

    Ok(list.results)
  }

  async fn try_fetch_film(&self, locator: &str) -> Result<Film> {
    let url = self.entity_endpoint(&self.api.film_path, locator)?;
    self.get_json(url).await
  }

  async fn try_fetch_character(&self, locator: &str) -> Result<Character> {
    let url = self.entity_endpoint(&self.api.character_path, locator)?;
    self.get_json(url).await
  }
}

#[async_trait]
impl CatalogGateway for CatalogClient {
  async fn list_films(&self) -> Vec<Film> {
    match self.try_list_films().await {
      Ok(films) => films,
      Err(e) => {
        warn!(error = %e, "failed to list films");
        Vec::new()
      }
    }
  }

  async fn fetch_film(&self, locator: &str) -> Option<Film> {
    match self.try_fetch_film(locator).await {
      Ok(film) => Some(film),
      Err(e) => {
        warn!(locator, error = %e, "failed to fetch film");
        None
      }
    }
  }

  async fn fetch_character(&self, locator: &str) -> Option<Character> {
    match self.try_fetch_character(locator).await {
      Ok(character) => Some(character),
      Err(e) => {
        warn!(locator, error = %e, "failed to fetch character");
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer) -> CatalogClient {
    let api = ApiConfig {
      url: format!("{}/api", server.uri()),
      ..Default::default()
    };
    CatalogClient::new(&api).unwrap()
  }

  fn film_json(id: u32, characters: &[&str]) -> serde_json::Value {
    json!({
      "title": format!("Film {}", id),
      "episode_id": id,
      "opening_crawl": "It is a period of civil war.",
      "director": "George Lucas",
      "producer": "Gary Kurtz",
      "release_date": "1977-05-25",
      "characters": characters,
      "planets": [],
      "starships": [],
      "vehicles": [],
      "species": [],
      "created": "2014-12-10T14:23:31.880000Z",
      "edited": "2014-12-20T19:49:45.256000Z",
      "url": format!("https://swapi.dev/api/films/{}/", id),
    })
  }

  #[test]
  fn test_rejects_invalid_base_url() {
    let api = ApiConfig {
      url: "not a url".to_string(),
      ..Default::default()
    };
    assert!(CatalogClient::new(&api).is_err());
  }

  #[tokio::test]
  async fn test_list_films() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/api/films"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [film_json(1, &[]), film_json(2, &[])],
      })))
      .mount(&server)
      .await;

    let films = client_for(&server).list_films().await;
    assert_eq!(films.len(), 2);
    assert_eq!(films[0].title, "Film 1");
    assert_eq!(films[1].url, "https://swapi.dev/api/films/2/");
  }

  #[tokio::test]
  async fn test_list_films_server_error_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/api/films"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    assert!(client_for(&server).list_films().await.is_empty());
  }

  #[tokio::test]
  async fn test_fetch_film_uses_extracted_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/api/films/1"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(film_json(1, &["https://swapi.dev/api/people/1/"])),
      )
      .expect(1)
      .mount(&server)
      .await;

    let film = client_for(&server)
      .fetch_film("https://swapi.dev/api/films/1/")
      .await
      .unwrap();
    assert_eq!(film.episode_id, 1);
    assert_eq!(film.characters, vec!["https://swapi.dev/api/people/1/"]);
  }

  #[tokio::test]
  async fn test_fetch_film_decode_failure_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/api/films/1"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
      .mount(&server)
      .await;

    let film = client_for(&server)
      .fetch_film("https://swapi.dev/api/films/1/")
      .await;
    assert!(film.is_none());
  }

  #[tokio::test]
  async fn test_fetch_character() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/api/people/1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "name": "Luke Skywalker",
        "height": "172",
        "mass": "77",
        "films": ["https://swapi.dev/api/films/1/"],
        "url": "https://swapi.dev/api/people/1/",
      })))
      .mount(&server)
      .await;

    let character = client_for(&server)
      .fetch_character("https://swapi.dev/api/people/1/")
      .await
      .unwrap();
    assert_eq!(character.name, "Luke Skywalker");
    assert_eq!(character.films, vec!["https://swapi.dev/api/films/1/"]);
    assert!(character.species.is_empty());
  }

  #[tokio::test]
  async fn test_fetch_character_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/api/people/99"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let character = client_for(&server)
      .fetch_character("https://swapi.dev/api/people/99/")
      .await;
    assert!(character.is_none());
  }

  #[tokio::test]
  async fn test_unreachable_server_is_absorbed() {
    let api = ApiConfig {
      url: "http://127.0.0.1:1/api".to_string(),
      ..Default::default()
    };
    let client = CatalogClient::new(&api).unwrap();

    assert!(client.list_films().await.is_empty());
    assert!(client
      .fetch_film("https://swapi.dev/api/films/1/")
      .await
      .is_none());
  }
}
