use anyhow::{Context, Result, bail};
use serde::Deserialize;
use ureq::Agent;

use crate::config::{Config, MAX_PER_PAGE};
use crate::model::{Candidate, PhotoUrls};

const MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;
const MAX_ERROR_BODY_BYTES: u64 = 4 * 1024;

/// Where candidates and their bytes come from.
pub trait ImageSource: Send + Sync {
    /// Up to `MAX_PER_PAGE` candidates for `query`, in result rank order.
    fn search(&self, query: &str) -> Result<Vec<Candidate>>;

    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<PhotoResult>,
}

#[derive(Debug, Deserialize)]
struct PhotoResult {
    #[serde(default)]
    id: String,
    urls: PhotoUrls,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    user: Option<PhotoUser>,
}

#[derive(Debug, Deserialize)]
struct PhotoUser {
    name: Option<String>,
}

pub fn parse_search_response(body: &str, limit: usize) -> Result<Vec<Candidate>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Malformed search response")?;

    Ok(response
        .results
        .into_iter()
        .take(limit.min(MAX_PER_PAGE))
        .enumerate()
        .map(|(rank, photo)| Candidate {
            rank,
            id: photo.id,
            urls: photo.urls,
            author: photo.user.and_then(|u| u.name),
            description: photo.alt_description.filter(|d| !d.trim().is_empty()),
            width: photo.width,
            height: photo.height,
        })
        .collect())
}

pub struct UnsplashClient {
    agent: Agent,
    api_url: String,
    access_key: String,
    per_page: usize,
    orientation: String,
    content_filter: String,
}

impl UnsplashClient {
    pub fn new(config: &Config) -> Self {
        let agent_config = Agent::config_builder().http_status_as_error(false).build();

        Self {
            agent: Agent::new_with_config(agent_config),
            api_url: config.api_url.clone(),
            access_key: config.access_key.clone(),
            per_page: config.per_page.clamp(1, MAX_PER_PAGE),
            orientation: config.orientation.clone(),
            content_filter: config.content_filter.clone(),
        }
    }

    pub fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        vec![
            ("query", query.to_string()),
            ("orientation", self.orientation.clone()),
            ("per_page", self.per_page.to_string()),
            ("content_filter", self.content_filter.clone()),
        ]
    }
}

impl ImageSource for UnsplashClient {
    fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        if self.access_key.is_empty() {
            bail!(
                "No access key configured (set access_key in the config file or {})",
                crate::config::ACCESS_KEY_ENV
            );
        }

        let mut request = self
            .agent
            .get(&self.api_url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1");
        for (key, value) in self.query_params(query) {
            request = request.query(key, value);
        }

        let mut response = request
            .call()
            .with_context(|| format!("Search request for '{}' failed", query))?;
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .context("Failed to read search response")?;

        if !status.is_success() {
            bail!("Search error ({}): {}", status, body);
        }

        parse_search_response(&body, self.per_page)
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .with_context(|| format!("Download of {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .body_mut()
                .with_config()
                .limit(MAX_ERROR_BODY_BYTES)
                .read_to_string()
                .unwrap_or_default();
            bail!("Download of {} returned {}: {}", url, status, body.trim());
        }
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_IMAGE_BYTES)
            .read_to_vec()
            .with_context(|| format!("Failed to read image body from {}", url))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Answers a single HTTP request on a loopback port with `status` and
    /// `body`. Returns the base address and the raw request head it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
        });
        (addr, rx)
    }

    fn client_for(addr: &str) -> UnsplashClient {
        UnsplashClient::new(&Config {
            api_url: format!("{}/search/photos", addr),
            access_key: "test-key".to_string(),
            ..Config::default()
        })
    }

    fn photo_json(id: &str) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "width": 3000,
                "height": 4500,
                "alt_description": "rain on a window",
                "user": {{ "name": "Sam" }},
                "urls": {{
                    "raw": "https://images.example/{id}?raw",
                    "full": "https://images.example/{id}?full",
                    "regular": "https://images.example/{id}?w=1080",
                    "small": "https://images.example/{id}?w=400",
                    "thumb": "https://images.example/{id}?w=200"
                }}
            }}"#
        )
    }

    #[test]
    fn test_parse_search_response() {
        let body = format!(
            r#"{{ "total": 2, "total_pages": 1, "results": [{}, {}] }}"#,
            photo_json("a1"),
            photo_json("b2")
        );
        let candidates = parse_search_response(&body, 5).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].rank, 0);
        assert_eq!(candidates[1].rank, 1);
        assert_eq!(candidates[1].id, "b2");
        assert_eq!(candidates[0].urls.regular, "https://images.example/a1?w=1080");
        assert_eq!(candidates[0].author.as_deref(), Some("Sam"));
        assert_eq!(candidates[0].height, 4500);
    }

    #[test]
    fn test_parse_truncates_to_five() {
        let photos: Vec<String> = (0..8).map(|i| photo_json(&format!("p{}", i))).collect();
        let body = format!(r#"{{ "results": [{}] }}"#, photos.join(","));
        let candidates = parse_search_response(&body, 10).unwrap();
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[4].id, "p4");
    }

    #[test]
    fn test_parse_minimal_and_empty() {
        let body = r#"{ "results": [ { "urls": { "regular": "https://x/r" } } ] }"#;
        let candidates = parse_search_response(body, 5).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].author.is_none());
        assert!(candidates[0].urls.full.is_empty());

        let empty = parse_search_response(r#"{ "results": [] }"#, 5).unwrap();
        assert!(empty.is_empty());

        assert!(parse_search_response(r#"{ "errors": ["OAuth error"] }"#, 5).is_err());
    }

    #[test]
    fn test_query_params() {
        let client = UnsplashClient::new(&Config::default());
        let params = client.query_params("rainy night city lights");
        assert_eq!(
            params,
            vec![
                ("query", "rainy night city lights".to_string()),
                ("orientation", "portrait".to_string()),
                ("per_page", "5".to_string()),
                ("content_filter", "high".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_sends_key_and_params() {
        let body = r#"{ "results": [ { "id": "n1", "urls": { "regular": "https://x/r" } } ] }"#;
        let (addr, requests) = serve_once("200 OK", body);
        let candidates = client_for(&addr).search("rainy night city lights").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "n1");

        let head = requests.recv().unwrap().to_lowercase();
        assert!(head.starts_with("get /search/photos?"), "{}", head);
        assert!(head.contains("client-id test-key"), "{}", head);
        assert!(head.contains("accept-version: v1"), "{}", head);
        assert!(head.contains("per_page=5"), "{}", head);
        assert!(head.contains("orientation=portrait"), "{}", head);
        assert!(head.contains("content_filter=high"), "{}", head);
    }

    #[test]
    fn test_search_error_status_reports_body() {
        let (addr, _requests) = serve_once(
            "401 Unauthorized",
            r#"{"errors":["OAuth error: The access token is invalid"]}"#,
        );
        let err = client_for(&addr).search("sunny afternoon sky").unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.contains("401"), "{}", text);
        assert!(text.contains("OAuth error: The access token is invalid"), "{}", text);
    }

    #[test]
    fn test_fetch_error_status_is_an_error() {
        let (addr, _requests) = serve_once("404 Not Found", r#"{"errors":["Not found"]}"#);
        let url = format!("{}/photo-123", addr);
        let err = client_for(&addr).fetch(&url).unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.contains("404"), "{}", text);
        assert!(text.contains("Not found"), "{}", text);
    }

    #[test]
    fn test_fetch_returns_body_bytes() {
        let (addr, _requests) = serve_once("200 OK", "not-really-a-jpeg");
        let bytes = client_for(&addr).fetch(&format!("{}/photo-123", addr)).unwrap();
        assert_eq!(bytes, b"not-really-a-jpeg");
    }

    #[test]
    fn test_search_without_key_fails_fast() {
        let client = UnsplashClient::new(&Config::default());
        let err = client.search("anything").unwrap_err();
        assert!(err.to_string().contains("access key"));
    }
}
