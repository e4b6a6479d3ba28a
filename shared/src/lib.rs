// lib.rs - solution review core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod subscription;
pub mod view;

pub use app::App;
pub use cache::{CacheChange, CacheError, CacheKey, QueryCache};
pub use capabilities::{Capabilities, Effect};
pub use config::ReviewConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{ErrorKind, ReviewError};
pub use event::{Event, PlatformEvent, PlatformEventName};
pub use model::{Model, ProblemStatement, ScreenshotEntry, ScreenshotRef, Solution};
pub use view::{select_view, ViewInputs, ViewKind, ViewModel, ViewState};

pub use config::DEFAULT_SCREENSHOT_LIMIT;
