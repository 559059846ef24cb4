use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analysis::Analyzer;
use crate::i18n::{Language, Translation};
use crate::model::{AnalysisResult, RadarPoint};
use crate::session::{Applied, Session, TransitionError};
use crate::storage::SideChannel;
use crate::upload::{self, UploadError};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("analysis task aborted: {0}")]
    TaskFailed(String),
}

/// Everything the page needs to draw the current screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub screen: &'static str,
    pub language: Language,
    pub rtl: bool,
    pub texts: &'static Translation,
    pub preview_url: Option<String>,
    pub result: Option<AnalysisResult>,
    pub radar: Vec<RadarPoint>,
    pub error: Option<String>,
}

impl SessionView {
    fn of(id: Uuid, session: &Session) -> Self {
        let screen = session.screen();
        let result = screen.result().cloned();
        Self {
            id,
            screen: screen.name(),
            language: session.language(),
            rtl: session.language().is_rtl(),
            texts: session.language().texts(),
            preview_url: screen.image().map(|i| i.preview_url.clone()),
            radar: result.as_ref().map(AnalysisResult::radar).unwrap_or_default(),
            result,
            error: screen
                .failure()
                .map(|_| session.language().texts().failed_message.to_string()),
        }
    }
}

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    session: Session,
    touched: Instant,
}

impl Entry {
    fn touch(&mut self) -> &mut Session {
        self.touched = Instant::now();
        &mut self.session
    }
}

pub struct Controller {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    analyzer: Arc<dyn Analyzer>,
    side_channel: SideChannel,
    max_upload_bytes: usize,
    session_ttl: Duration,
}

impl Controller {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        side_channel: SideChannel,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            analyzer,
            side_channel,
            max_upload_bytes,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub async fn create_session(&self, language: Language) -> SessionView {
        let id = Uuid::new_v4();
        let session = Session::new(language);
        let view = SessionView::of(id, &session);
        {
            let mut sessions = self.sessions.write().await;
            self.evict_expired(&mut sessions);
            sessions.insert(
                id,
                Entry {
                    session,
                    touched: Instant::now(),
                },
            );
        }
        info!(session = %id, %language, "session created");
        view
    }

    /// Drops sessions idle for longer than the TTL and returns how many.
    ///
    /// Sessions with an analysis in flight are kept until it completes.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions)
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, Entry>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.session.in_flight() || entry.touched.elapsed() < self.session_ttl
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "expired sessions dropped");
        }
        evicted
    }

    /// Sweeps expired sessions every `period` until the controller is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let controller: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.sweep().await;
            }
        })
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, ControllerError> {
        self.update(id, |_| Ok(())).await
    }

    async fn update<F>(&self, id: Uuid, f: F) -> Result<SessionView, ControllerError>
    where
        F: FnOnce(&mut Session) -> Result<(), ControllerError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(ControllerError::SessionNotFound(id))?
            .touch();
        f(session)?;
        Ok(SessionView::of(id, session))
    }

    pub async fn set_language(
        &self,
        id: Uuid,
        language: Language,
    ) -> Result<SessionView, ControllerError> {
        self.update(id, |s| {
            s.set_language(language);
            Ok(())
        })
        .await
    }

    /// Validates an uploaded file and makes it the session's selected image.
    pub async fn select_image(
        &self,
        id: Uuid,
        bytes: &[u8],
        declared_mime: Option<&str>,
    ) -> Result<SessionView, ControllerError> {
        let image = upload::accept_upload(bytes, declared_mime, self.max_upload_bytes)
            .inspect_err(|e| warn!(session = %id, error = %e, "upload rejected"))?;
        self.update(id, |s| Ok(s.select_image(image)?)).await
    }

    pub async fn discard_image(&self, id: Uuid) -> Result<SessionView, ControllerError> {
        self.update(id, |s| Ok(s.discard_image()?)).await
    }

    pub async fn dismiss_error(&self, id: Uuid) -> Result<SessionView, ControllerError> {
        self.update(id, |s| Ok(s.dismiss_error()?)).await
    }

    pub async fn reset(&self, id: Uuid) -> Result<SessionView, ControllerError> {
        self.update(id, |s| {
            s.reset();
            Ok(())
        })
        .await
    }

    /// Runs one analysis for the session and returns the resulting screen.
    ///
    /// The session moves to `Analyzing` before the lock is released, so a
    /// second call while this one is in flight fails with a transition error.
    pub async fn analyze(self: &Arc<Self>, id: Uuid) -> Result<SessionView, ControllerError> {
        let ticket = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(&id)
                .ok_or(ControllerError::SessionNotFound(id))?
                .touch();
            session.begin_analysis()?
        };

        self.side_channel.dispatch(ticket.image.clone());

        // Detached from the request future: a client hanging up must not
        // leave the session stuck in `Analyzing`.
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            let outcome = controller
                .analyzer
                .analyze(&ticket.image, ticket.language)
                .await
                .map_err(|err| {
                    error!(
                        session = %id,
                        analyzer = controller.analyzer.name(),
                        kind = err.kind(),
                        error = %err,
                        "analysis failed"
                    );
                    err.kind()
                });

            let mut sessions = controller.sessions.write().await;
            let Some(entry) = sessions.get_mut(&id) else {
                return;
            };
            if entry.touch().complete(ticket, outcome) == Applied::Stale {
                info!(session = %id, "dropping result of a superseded analysis");
            }
        });

        task.await
            .map_err(|e| ControllerError::TaskFailed(e.to_string()))?;
        self.view(id).await
    }
}
