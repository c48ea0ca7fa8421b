//! Client: owns the ordered page list and the attached-session count

use super::page::Page;
use crate::cdp::CdpTransport;
use crate::config::Config;
use crate::sink::{FrameSink, NullFrameSink, NullTelemetry, TelemetrySink};
use crate::{Error, Result};
use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Client identity: the configuration it was created for
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub domain: String,
    pub proxy: bool,
    pub headless: bool,
}

impl ClientOptions {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            proxy: false,
            headless: true,
        }
    }
}

/// A persistable cookie; storage itself belongs to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieRecord {
    pub path: String,
    pub name: String,
    pub domain: String,
    pub value: String,
    pub expires: f64,
}

/// Cookie expiry applied when none is known
pub const COOKIE_EXPIRY_DAYS: i64 = 180;

type CloseHook = Box<dyn Fn() + Send + Sync>;

/// One automated browser: pages, sub-session refcount, close hook
pub struct Client {
    options: ClientOptions,
    config: Config,
    transport: Arc<dyn CdpTransport>,
    pages: Mutex<Vec<Arc<Page>>>,
    /// Kept at `pages.len() - 1`; goes to −1 when the last page is
    /// removed, so every reader bounds-checks before indexing
    current_page_index: Mutex<isize>,
    sessions: Mutex<HashSet<String>>,
    close_fired: AtomicBool,
    cancel: CancellationToken,
    on_close: Mutex<Option<CloseHook>>,
    restored_cookies: Mutex<Vec<CookieRecord>>,
    telemetry: Arc<dyn TelemetrySink>,
    frames: Arc<dyn FrameSink>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("domain", &self.options.domain)
            .field("pages", &self.pages.lock().unwrap().len())
            .finish()
    }
}

impl Client {
    pub fn new(
        options: ClientOptions,
        config: Config,
        transport: Arc<dyn CdpTransport>,
    ) -> Arc<Self> {
        Self::with_sinks(
            options,
            config,
            transport,
            Arc::new(NullTelemetry),
            Arc::new(NullFrameSink),
        )
    }

    pub fn with_sinks(
        options: ClientOptions,
        config: Config,
        transport: Arc<dyn CdpTransport>,
        telemetry: Arc<dyn TelemetrySink>,
        frames: Arc<dyn FrameSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            options,
            config,
            transport,
            pages: Mutex::new(Vec::new()),
            current_page_index: Mutex::new(-1),
            sessions: Mutex::new(HashSet::new()),
            close_fired: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            on_close: Mutex::new(None),
            restored_cookies: Mutex::new(Vec::new()),
            telemetry,
            frames,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn CdpTransport> {
        Arc::clone(&self.transport)
    }

    pub(crate) fn telemetry(&self) -> Arc<dyn TelemetrySink> {
        Arc::clone(&self.telemetry)
    }

    pub(crate) fn frames(&self) -> Arc<dyn FrameSink> {
        Arc::clone(&self.frames)
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Hook invoked exactly once when the client shuts down
    pub fn set_on_close<F: Fn() + Send + Sync + 'static>(&self, hook: F) {
        *self.on_close.lock().unwrap() = Some(Box::new(hook));
    }

    /// Load a URL into the page with this ID, creating the page if absent
    pub async fn load(self: &Arc<Self>, page_id: &str, url: &str) -> Result<Arc<Page>> {
        let page = match self.page_by(page_id) {
            Some(page) => page,
            None => Page::create(self, page_id).await?,
        };
        page.load(url).await?;
        Ok(page)
    }

    pub fn page_by(&self, page_id: &str) -> Option<Arc<Page>> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .find(|page| page.id() == page_id)
            .cloned()
    }

    pub fn pages(&self) -> Vec<Arc<Page>> {
        self.pages.lock().unwrap().clone()
    }

    pub fn page_count(&self) -> usize {
        self.pages.lock().unwrap().len()
    }

    /// The most recently added page, when the list is non-empty
    pub fn current_page(&self) -> Option<Arc<Page>> {
        let pages = self.pages.lock().unwrap();
        let index = *self.current_page_index.lock().unwrap();
        if index < 0 || index as usize >= pages.len() {
            return None;
        }
        Some(Arc::clone(&pages[index as usize]))
    }

    pub fn current_page_index(&self) -> isize {
        *self.current_page_index.lock().unwrap()
    }

    pub(crate) fn add_page(&self, page: Arc<Page>) {
        let mut pages = self.pages.lock().unwrap();
        pages.push(page);
        *self.current_page_index.lock().unwrap() = pages.len() as isize - 1;
    }

    pub(crate) fn remove_page(&self, page_id: &str) {
        let mut pages = self.pages.lock().unwrap();
        pages.retain(|page| page.id() != page_id);
        *self.current_page_index.lock().unwrap() = pages.len() as isize - 1;
    }

    pub(crate) fn add_session(&self, session_id: String) {
        self.sessions.lock().unwrap().insert(session_id);
    }

    /// Remove an attached sub-session; the remove-last transition fires
    /// the close hook
    pub(crate) fn remove_session(&self, session_id: &str) {
        let empty = {
            let mut sessions = self.sessions.lock().unwrap();
            sessions.remove(session_id);
            sessions.is_empty()
        };
        if empty {
            self.fire_close_hook();
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn fire_close_hook(&self) {
        if self
            .close_fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            if let Some(hook) = self.on_close.lock().unwrap().as_ref() {
                hook();
            }
        }
    }

    /// Cookies the caller restored from storage; applied on the next load
    pub fn restore_cookies(&self, records: Vec<CookieRecord>) {
        *self.restored_cookies.lock().unwrap() = records;
    }

    pub(crate) fn restored_cookies(&self) -> Vec<CookieRecord> {
        self.restored_cookies.lock().unwrap().clone()
    }

    /// Set name/value cookie pairs on every page, scoped to the client's
    /// domain with a 180-day expiry
    pub async fn set_cookies(&self, pairs: &[(String, String)]) -> Result<()> {
        let expires = (Utc::now() + ChronoDuration::days(COOKIE_EXPIRY_DAYS)).timestamp() as f64;
        let pages = self.pages();
        for (name, value) in pairs {
            for page in &pages {
                page.session()
                    .set_cookie(&crate::cdp::types::SetCookieParams {
                        name: name.clone(),
                        value: value.clone(),
                        domain: self.options.domain.clone(),
                        path: None,
                        expires: Some(expires),
                        http_only: true,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// All cookies of the browser, as persistable records
    pub async fn save_cookies(&self) -> Result<Vec<CookieRecord>> {
        let page = self
            .pages()
            .into_iter()
            .next()
            .ok_or_else(|| Error::page_not_found("client has no pages"))?;
        let cookies = page.session().get_all_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|cookie| CookieRecord {
                path: cookie.path,
                name: cookie.name,
                domain: cookie.domain,
                value: cookie.value,
                expires: cookie.expires,
            })
            .collect())
    }

    /// Write a JPEG of the current page to `path`
    pub async fn snapshot(&self, path: &std::path::Path) -> Result<()> {
        let page = self.current_page().ok_or_else(|| Error::page_not_found("client has no pages"))?;
        let bytes = page.screenshot_bytes().await?;
        tokio::fs::write(path, bytes).await?;
        info!(path = %path.display(), "wrote snapshot");
        Ok(())
    }

    /// Cancel and drop every page, then fire the close hook
    ///
    /// A no-op on an already-empty client.
    pub fn close(&self) {
        let pages = {
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                return;
            }
            let drained: Vec<_> = pages.drain(..).collect();
            *self.current_page_index.lock().unwrap() = -1;
            drained
        };
        for page in pages {
            page.cancel();
        }
        self.cancel.cancel();
        warn!(domain = %self.options.domain, "client closed");
        self.fire_close_hook();
    }
}
