//! Mock translation backend for testing.
//!
//! Allows scripting per-call results and inspecting the requests a backend
//! received, so orchestration code can be tested without HTTP. Unscripted
//! calls succeed with a deterministic `[tgt] text` echo.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{BackendRequest, BackendTranslation, TranslationBackend};
use polyglot_core::models::{LanguageCode, ProviderId};

#[derive(Default)]
struct MockState {
    script: VecDeque<ProviderResult<BackendTranslation>>,
    default_error: Option<ProviderError>,
    requests: Vec<BackendRequest>,
}

/// Scripted stand-in for a [`TranslationBackend`].
#[derive(Clone)]
pub struct MockBackend {
    id: ProviderId,
    detects_source: bool,
    targets: HashSet<LanguageCode>,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            detects_source: true,
            targets: HashSet::new(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn with_targets(mut self, codes: &[&str]) -> Self {
        self.targets = codes.iter().map(|c| LanguageCode::new(c)).collect();
        self
    }

    pub fn without_source_detection(mut self) -> Self {
        self.detects_source = false;
        self
    }

    /// Queue one result; queued results are consumed in order before the
    /// default behavior applies.
    pub fn with_response(self, result: ProviderResult<BackendTranslation>) -> Self {
        self.state.lock().unwrap().script.push_back(result);
        self
    }

    /// Every unscripted call fails with a clone of this error.
    pub fn failing_with(self, error: ProviderError) -> Self {
        self.state.lock().unwrap().default_error = Some(error);
        self
    }

    /// Number of `translate` calls this backend received.
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// The deterministic echo produced for unscripted successful calls.
    pub fn echo(text: &str, tgt: &LanguageCode) -> String {
        format!("[{}] {}", tgt, text)
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn supported_targets(&self) -> &HashSet<LanguageCode> {
        &self.targets
    }

    fn detects_source(&self) -> bool {
        self.detects_source
    }

    async fn translate(&self, request: &BackendRequest) -> ProviderResult<BackendTranslation> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if !self.targets.contains(&request.tgt) {
            return Err(ProviderError::Unsupported(request.tgt.clone()));
        }
        if let Some(result) = state.script.pop_front() {
            return result;
        }
        if let Some(error) = &state.default_error {
            return Err(error.clone());
        }

        let detected = request.src.clone().or_else(|| {
            self.detects_source.then(|| LanguageCode::new("en"))
        });
        Ok(BackendTranslation {
            text: Self::echo(&request.text, &request.tgt),
            detected_src: detected,
            confidence: Some(0.9),
        })
    }
}
