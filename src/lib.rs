// Library exports for weather-bg-picker

pub mod app;
pub mod components;
pub mod config;
pub mod controller;
pub mod event;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod search_worker;
pub mod unsplash;
pub mod widgets;

pub use model::{Candidate, Category};
pub use unsplash::{ImageSource, UnsplashClient};
