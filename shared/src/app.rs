use tracing::{debug, info, instrument, warn};

use crate::cache::CacheKey;
use crate::capabilities::{BridgeOutput, BridgeResult, Capabilities};
use crate::error::{ErrorKind, ReviewError};
use crate::event::{Event, PlatformEvent, PlatformEventName};
use crate::model::{Model, ProblemStatement, Solution, UnixTimeMs};
use crate::view::ViewModel;

pub const RESET_SETTLE_DELAY_MS: u64 = 0;

#[derive(Default)]
pub struct App;

impl App {
    fn handle_platform(event: PlatformEvent, model: &mut Model, caps: &Capabilities) {
        match event {
            PlatformEvent::ScreenshotTaken => Self::fetch_screenshots(model, caps),

            PlatformEvent::ResetView => {
                model.reset_generation += 1;
                model.is_resetting = true;
                model.cache.remove_many(&CacheKey::ALL);
                model.screenshots.clear();

                let generation = model.reset_generation;
                caps.scheduler.defer(RESET_SETTLE_DELAY_MS, move || Event::ResetSettled {
                    generation,
                });
                info!(generation, "view reset");
            }

            PlatformEvent::SolutionStart => {
                model.cache.invalidate(CacheKey::Solution);
            }

            PlatformEvent::ProblemExtracted(payload) => {
                match ProblemStatement::from_payload(payload) {
                    Ok(statement) => Self::store(model, CacheKey::ProblemStatement, &statement),
                    Err(e) => warn!(error = %ReviewError::from(e), "ignoring problem statement"),
                }
            }

            PlatformEvent::SolutionError(message) => {
                let error = ReviewError::new(ErrorKind::Extraction, message);
                warn!(error = %error, "solution generation failed");
                Self::show_error(caps, &error);

                if model.solution().is_some() {
                    // Keep the last good solution on screen.
                    model.cache.mark_fresh(CacheKey::Solution);
                } else {
                    model
                        .cache
                        .remove_many(&[CacheKey::Solution, CacheKey::ProblemStatement]);
                }
            }

            PlatformEvent::SolutionSuccess(payload) => match Solution::from_payload(payload) {
                Ok(solution) => {
                    Self::store(model, CacheKey::Solution, &solution);
                    Self::fetch_screenshots(model, caps);
                }
                Err(e) => warn!(error = %ReviewError::from(e), "ignoring solution-success without a usable solution"),
            },

            PlatformEvent::DebugStart => {
                model.is_debug_processing = true;
            }

            PlatformEvent::DebugSuccess(payload) => {
                match Solution::from_payload(Some(payload)) {
                    Ok(solution) => Self::store(model, CacheKey::NewSolution, &solution),
                    Err(e) => warn!(error = %ReviewError::from(e), "ignoring debug revision"),
                }
                model.is_debug_processing = false;
            }

            PlatformEvent::DebugError(message) => {
                warn!(%message, "debug pass failed");
                Self::show_error(caps, &ReviewError::from_kind(ErrorKind::Debug));
                model.is_debug_processing = false;
            }

            PlatformEvent::ProcessingNoScreenshots => {
                caps.toast
                    .neutral("No Screenshots", "There are no extra screenshots to process.");
            }
        }
    }

    fn store<T: serde::Serialize>(model: &mut Model, key: CacheKey, value: &T) {
        if let Err(e) = model.cache.set(key, value) {
            let error = ReviewError::new(ErrorKind::Cache, e.to_string());
            warn!(error = %error, %key, "cache write failed");
        }
    }

    fn show_error(caps: &Capabilities, error: &ReviewError) {
        if error.kind.is_user_visible() {
            caps.toast.error(error.title(), error.user_facing_message());
        }
    }

    #[instrument(skip_all, fields(epoch = model.mount.epoch, generation = model.reset_generation))]
    fn fetch_screenshots(model: &Model, caps: &Capabilities) {
        let epoch = model.mount.epoch;
        let generation = model.reset_generation;
        caps.bridge.list_screenshots(move |result| Event::ScreenshotsFetched {
            epoch,
            generation,
            result,
        });
    }

    fn apply_screenshots(model: &mut Model, caps: &Capabilities, result: BridgeResult) {
        match result {
            Ok(BridgeOutput::Screenshots(entries)) => {
                let total = entries.len();
                model
                    .screenshots
                    .replace(entries, model.config.screenshot_limit, UnixTimeMs::now());
                debug!(total, kept = model.screenshots.len(), "screenshots refreshed");
            }
            Ok(other) => {
                warn!(?other, "unexpected bridge output for screenshot list");
            }
            Err(e) => {
                let error = ReviewError::from_kind(ErrorKind::ScreenshotFetch)
                    .with_internal(e.to_string());
                warn!(error = %error, "keeping previous screenshot list");
                if model.config.surface_fetch_errors {
                    Self::show_error(caps, &error);
                }
            }
        }
    }

    fn delete_screenshot(model: &Model, caps: &Capabilities, index: usize) {
        let Some(path) = model.screenshots.path_at(index).map(str::to_string) else {
            warn!(index, len = model.screenshots.len(), "no screenshot at index");
            return;
        };
        let epoch = model.mount.epoch;
        let target = path.clone();
        caps.bridge.delete_screenshot(path, move |result| Event::ScreenshotDeleted {
            epoch,
            path: target,
            result,
        });
    }

    fn copy_code(model: &Model, caps: &Capabilities) {
        let view = ViewModel::from_model(model);
        let Some(code) = view.visible_code() else {
            debug!("nothing to copy");
            return;
        };
        let epoch = model.mount.epoch;
        caps.bridge
            .write_clipboard(code.to_string(), move |result| Event::CodeCopied { epoch, result });
    }

    /// Whether a completion issued under `epoch` may still touch the model.
    fn accepts(model: &Model, epoch: u64, event: &'static str) -> bool {
        let accepted = model.mount.accepts(epoch);
        if !accepted {
            debug!(event, epoch, current = model.mount.epoch, "dropping stale completion");
        }
        accepted
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_action() {
            debug!(event = event_name, "user action");
        }

        let was_resetting = model.is_resetting;
        let was_debug_processing = model.is_debug_processing;
        let screenshots_before = model.screenshots.revision();

        match event {
            Event::Noop => {}

            Event::Mounted => {
                if model.mount.active {
                    debug!(epoch = model.mount.epoch, "already mounted");
                } else {
                    model.mount.epoch += 1;
                    model.mount.active = true;
                    caps.subscriptions.register(PlatformEventName::ALL.to_vec());
                    Self::fetch_screenshots(model, caps);
                    info!(epoch = model.mount.epoch, "mounted");
                }
            }

            Event::Unmounted => {
                if model.mount.active {
                    model.mount.active = false;
                    caps.subscriptions.unregister(PlatformEventName::ALL.to_vec());
                    info!(epoch = model.mount.epoch, "unmounted");
                }
            }

            Event::Configure(config) => match config.validate() {
                Ok(()) => {
                    model.screenshots.truncate_front(config.screenshot_limit);
                    model.config = config;
                }
                Err(e) => warn!(error = %ReviewError::from(e), "keeping previous configuration"),
            },

            Event::Platform(platform) => {
                if model.mount.active {
                    Self::handle_platform(platform, model, caps);
                } else {
                    debug!(event = event_name, "not mounted, ignoring platform event");
                }
            }

            Event::DeleteScreenshot { index } => {
                if model.mount.active {
                    Self::delete_screenshot(model, caps, index);
                }
            }

            Event::CopyCode => {
                if model.mount.active {
                    Self::copy_code(model, caps);
                }
            }

            Event::ScreenshotsFetched {
                epoch,
                generation,
                result,
            } => {
                if Self::accepts(model, epoch, event_name) {
                    if generation == model.reset_generation {
                        Self::apply_screenshots(model, caps, result);
                    } else {
                        // Listed before a reset cleared the screen.
                        debug!(
                            generation,
                            current = model.reset_generation,
                            "dropping screenshot list from before reset"
                        );
                    }
                }
            }

            Event::ScreenshotDeleted {
                epoch,
                path,
                result,
            } => {
                if Self::accepts(model, epoch, event_name) {
                    match result {
                        Ok(BridgeOutput::Deleted { success: true }) => {
                            info!(%path, "screenshot deleted");
                            Self::fetch_screenshots(model, caps);
                        }
                        other => {
                            let error = ReviewError::from_kind(ErrorKind::ScreenshotDelete)
                                .with_context("path", path);
                            warn!(error = %error, result = ?other, "screenshot delete failed");
                            Self::show_error(caps, &error);
                        }
                    }
                }
            }

            Event::CodeCopied { epoch, result } => {
                if Self::accepts(model, epoch, event_name) {
                    match result {
                        Ok(BridgeOutput::ClipboardWritten) => {
                            caps.toast.success("Copied", "Code copied to clipboard.");
                        }
                        other => {
                            let error = ReviewError::from_kind(ErrorKind::Clipboard);
                            warn!(result = ?other, "clipboard write failed");
                            Self::show_error(caps, &error);
                        }
                    }
                }
            }

            Event::ResetSettled { generation } => {
                if generation == model.reset_generation {
                    model.is_resetting = false;
                } else {
                    debug!(
                        generation,
                        current = model.reset_generation,
                        "superseded reset deferral"
                    );
                }
            }
        }

        let cache_changes = model.cache.take_changes();
        let changed = !cache_changes.is_empty()
            || model.is_resetting != was_resetting
            || model.is_debug_processing != was_debug_processing
            || model.screenshots.revision() != screenshots_before;
        if changed {
            debug!(event = event_name, changes = ?cache_changes, "render");
            caps.render.render();
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
