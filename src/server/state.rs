use std::sync::Arc;
use std::time::Duration;

use crate::analysis::RegionAnalyzer;
use crate::ocr::OcrEngine;
use crate::settings::{InpaintSettings, Settings};

/// Everything a request needs; cloned into each handler via `Arc`.
#[derive(Clone)]
pub struct ServerState {
    pub(crate) engine: Arc<dyn OcrEngine>,
    pub(crate) analyzer: RegionAnalyzer,
    pub(crate) inpaint: InpaintSettings,
    pub(crate) request_timeout: Duration,
    pub(crate) max_upload_bytes: usize,
}

impl ServerState {
    pub fn new(settings: &Settings, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine,
            analyzer: RegionAnalyzer::new(settings.analysis),
            inpaint: settings.inpaint,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}
