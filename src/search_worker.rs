// Runs category searches off the UI thread and posts results back over the
// app channel.

use anyhow::Result;
use crossbeam_channel::Sender;
use image::DynamicImage;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::event::{AppMsg, SearchTicket};
use crate::model::{Candidate, ImageVariant};
use crate::pipeline::resize::make_preview;
use crate::unsplash::ImageSource;

#[derive(Clone)]
pub struct SearchWorker {
    tx: Sender<AppMsg>,
    source: Arc<dyn ImageSource>,
    pool: Arc<ThreadPool>,
    preview_max: u32,
    preview_variant: ImageVariant,
}

impl SearchWorker {
    pub fn new(tx: Sender<AppMsg>, source: Arc<dyn ImageSource>, config: &Config) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.thread_count)
            .thread_name(|i| format!("preview-{}", i))
            .build()?;

        Ok(Self {
            tx,
            source,
            pool: Arc::new(pool),
            preview_max: config.preview_max,
            preview_variant: config.preview_variant,
        })
    }

    /// Spawns one thread for this search. There is no cancellation; a superseded
    /// search still reports back and the controller discards it.
    pub fn start_search(&self, ticket: SearchTicket) {
        let worker = self.clone();

        thread::spawn(move || {
            let msg = worker.run_search(ticket);
            let _ = worker.tx.send(msg);
        });
    }

    pub fn run_search(&self, ticket: SearchTicket) -> AppMsg {
        let phrase = ticket.category.phrase();
        log::debug!("Searching '{}' for {}", phrase, ticket.category);

        match self.source.search(phrase) {
            Ok(candidates) => {
                let previews = self.load_previews(&candidates);
                AppMsg::SearchCompleted {
                    ticket,
                    candidates,
                    previews,
                }
            }
            Err(e) => AppMsg::SearchFailed {
                ticket,
                error: format!("{:#}", e),
            },
        }
    }

    /// One entry per candidate, in rank order. Failed downloads or decodes become
    /// `None` and are logged.
    pub fn load_previews(&self, candidates: &[Candidate]) -> Vec<Option<DynamicImage>> {
        self.pool.install(|| {
            candidates
                .par_iter()
                .map(|candidate| {
                    let url = candidate.url(self.preview_variant);
                    let preview = self
                        .source
                        .fetch(url)
                        .and_then(|bytes| make_preview(&bytes, self.preview_max));
                    match preview {
                        Ok(image) => Some(image),
                        Err(e) => {
                            log::warn!("Preview {} failed: {:#}", candidate.rank + 1, e);
                            None
                        }
                    }
                })
                .collect()
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Category, PhotoUrls};
    use anyhow::{anyhow, bail};
    use crossbeam_channel::unbounded;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory image source: each query maps to a list of solid-colour photos.
    #[derive(Default)]
    pub struct FakeSource {
        pub photos: HashMap<String, Vec<(u32, u32, [u8; 3])>>,
        pub failing_queries: Vec<String>,
        pub broken_urls: Vec<String>,
        pub fetched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        pub fn with_query(mut self, query: &str, photos: Vec<(u32, u32, [u8; 3])>) -> Self {
            self.photos.insert(query.to_string(), photos);
            self
        }

        fn url(query: &str, rank: usize, variant: &str) -> String {
            format!("fake://{}/{}/{}", query.replace(' ', "+"), rank, variant)
        }
    }

    impl ImageSource for FakeSource {
        fn search(&self, query: &str) -> Result<Vec<Candidate>> {
            if self.failing_queries.iter().any(|q| q == query) {
                bail!("Search error (401 Unauthorized): OAuth error");
            }
            let photos = self.photos.get(query).cloned().unwrap_or_default();
            Ok(photos
                .iter()
                .enumerate()
                .take(5)
                .map(|(rank, (w, h, _))| Candidate {
                    rank,
                    id: format!("fake-{}", rank),
                    urls: PhotoUrls {
                        full: Self::url(query, rank, "full"),
                        regular: Self::url(query, rank, "regular"),
                        ..Default::default()
                    },
                    width: *w,
                    height: *h,
                    ..Default::default()
                })
                .collect())
        }

        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if let Ok(mut fetched) = self.fetched.lock() {
                fetched.push(url.to_string());
            }
            if self.broken_urls.iter().any(|u| u == url) {
                return Ok(b"definitely not an image".to_vec());
            }
            let mut parts = url.trim_start_matches("fake://").split('/');
            let query = parts.next().unwrap_or_default().replace('+', " ");
            let rank: usize = parts
                .next()
                .and_then(|r| r.parse().ok())
                .ok_or_else(|| anyhow!("bad fake url {}", url))?;
            let (w, h, color) = self
                .photos
                .get(&query)
                .and_then(|p| p.get(rank))
                .copied()
                .ok_or_else(|| anyhow!("404 for {}", url))?;

            let mut bytes = Vec::new();
            DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            Ok(bytes)
        }
    }

    fn worker_with(source: FakeSource) -> (SearchWorker, crossbeam_channel::Receiver<AppMsg>) {
        let (tx, rx) = unbounded();
        let config = Config {
            thread_count: 2,
            ..Config::default()
        };
        let worker = SearchWorker::new(tx, Arc::new(source), &config).unwrap();
        (worker, rx)
    }

    fn ticket(id: &str, generation: u64) -> SearchTicket {
        SearchTicket {
            category: id.parse::<Category>().unwrap(),
            generation,
        }
    }

    #[test]
    fn test_run_search_returns_previews_in_rank_order() {
        let source = FakeSource::default().with_query(
            "rainy night city lights",
            vec![(400, 800, [255, 0, 0]), (1200, 600, [0, 255, 0]), (100, 100, [0, 0, 255])],
        );
        let (worker, _rx) = worker_with(source);

        match worker.run_search(ticket("night_rain", 1)) {
            AppMsg::SearchCompleted {
                ticket: t,
                candidates,
                previews,
            } => {
                assert_eq!(t.generation, 1);
                assert_eq!(candidates.len(), 3);
                assert_eq!(previews.len(), 3);
                let first = previews[0].as_ref().unwrap();
                assert_eq!((first.width(), first.height()), (100, 200));
                let second = previews[1].as_ref().unwrap();
                assert_eq!((second.width(), second.height()), (200, 100));
                let third = previews[2].as_ref().unwrap();
                assert_eq!((third.width(), third.height()), (100, 100));
                assert_eq!(third.to_rgb8().get_pixel(50, 50), &Rgb([0, 0, 255]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_broken_preview_leaves_gap() {
        let mut source = FakeSource::default().with_query(
            "cloudy afternoon sky",
            vec![(300, 300, [1, 1, 1]), (300, 300, [2, 2, 2])],
        );
        source.broken_urls.push("fake://cloudy+afternoon+sky/0/regular".to_string());
        let (worker, _rx) = worker_with(source);

        match worker.run_search(ticket("afternoon_clouds", 4)) {
            AppMsg::SearchCompleted { previews, .. } => {
                assert!(previews[0].is_none());
                assert!(previews[1].is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_search_reports_error() {
        let mut source = FakeSource::default();
        source.failing_queries.push("starry night sky moon".to_string());
        let (worker, rx) = worker_with(source);

        worker.start_search(ticket("night_clear", 9));
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppMsg::SearchFailed { ticket: t, error } => {
                assert_eq!(t.generation, 9);
                assert!(error.contains("401"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_search() {
        let (worker, rx) = worker_with(FakeSource::default());
        worker.start_search(ticket("morning_snow", 2));
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppMsg::SearchCompleted {
                candidates,
                previews,
                ..
            } => {
                assert!(candidates.is_empty());
                assert!(previews.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
