//! Page: one browsing context, its event task, and the scripted surface

use super::client::Client;
use super::element::Element;
use crate::actions::{input, read};
use crate::cdp::{CdpEvent, CdpSession, DownloadState, PageEvent};
use crate::dom::ClientRect;
use crate::query::{wait_for, Predicate, Selector};
use crate::sink::LogLevel;
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Page lifecycle. Closed is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Created,
    Navigating,
    Ready,
    Closed,
}

/// One tab: a CDP session plus the background event task feeding it
pub struct Page {
    id: String,
    url: RwLock<String>,
    client: Weak<Client>,
    session: CdpSession,
    state: Mutex<PageState>,
    cancel: CancellationToken,
    pending_download: Mutex<Option<oneshot::Sender<String>>>,
    pending_new_target: Mutex<Option<oneshot::Sender<(String, String)>>>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("url", &self.url())
            .field("state", &self.state())
            .finish()
    }
}

impl Page {
    /// Allocate a fresh browsing context and register the page
    pub async fn create(client: &Arc<Client>, id: &str) -> Result<Arc<Self>> {
        let browser = CdpSession::new(client.transport());
        let target_id = browser.create_target("about:blank").await?;
        let session_id = browser.attach_to_target(&target_id).await?;
        Self::bind(client, id, session_id, String::new()).await
    }

    /// Bind an already-attached session into a page and start its event
    /// task
    pub async fn bind(
        client: &Arc<Client>,
        id: &str,
        session_id: String,
        url: String,
    ) -> Result<Arc<Self>> {
        let session = CdpSession::with_session(client.transport(), session_id);
        let page = Arc::new(Self {
            id: id.to_string(),
            url: RwLock::new(url),
            client: Arc::downgrade(client),
            session,
            state: Mutex::new(PageState::Created),
            cancel: client.cancel_token().child_token(),
            pending_download: Mutex::new(None),
            pending_new_target: Mutex::new(None),
        });
        page.spawn_event_task().await?;
        client.add_page(Arc::clone(&page));
        Ok(page)
    }

    async fn spawn_event_task(self: &Arc<Self>) -> Result<()> {
        let mut events = self.session.transport().listen_events().await?;
        let weak = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = events.recv() => {
                        let Some(event) = received else { break };
                        let Some(page) = weak.upgrade() else { break };
                        page.handle_event(event).await;
                    }
                }
            }
        });
        Ok(())
    }

    async fn handle_event(&self, event: CdpEvent) {
        // target-scoped events are only ours when the session id matches;
        // Target.* and Browser.* arrive at browser scope
        let ours = match event.session_id.as_deref() {
            Some(session_id) => Some(session_id) == self.session.session_id(),
            None => true,
        };
        let Some(parsed) = PageEvent::parse(&event) else {
            return;
        };
        match parsed {
            PageEvent::FrameNavigated { url } => {
                if ours {
                    debug!(page = %self.id, %url, "frame navigated");
                    *self.url.write().unwrap() = url;
                }
            }
            PageEvent::AttachedToTarget { session_id } => {
                if let Some(client) = self.client.upgrade() {
                    client.add_session(session_id);
                }
            }
            PageEvent::DetachedFromTarget { session_id } => {
                if let Some(client) = self.client.upgrade() {
                    client.remove_session(&session_id);
                }
            }
            PageEvent::TargetCreated { target_id, url } => {
                if !url.is_empty() {
                    if let Some(sender) = self.pending_new_target.lock().unwrap().take() {
                        let _ = sender.send((target_id, url));
                    }
                }
            }
            PageEvent::ExceptionThrown { description } => {
                if ours {
                    self.report("page script", &Error::script_execution_failed(description));
                }
            }
            PageEvent::JavascriptDialogOpening { message } => {
                if ours {
                    info!(page = %self.id, %message, "auto-accepting dialog");
                    let _ = self.session.handle_javascript_dialog(true).await;
                }
            }
            PageEvent::DownloadProgress {
                guid,
                state,
                received,
                total,
            } => match state {
                DownloadState::Completed => {
                    if let Some(sender) = self.pending_download.lock().unwrap().take() {
                        let _ = sender.send(guid);
                    }
                }
                DownloadState::InProgress => {
                    debug!(page = %self.id, received, total, "download progress");
                }
                DownloadState::Canceled => {}
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> String {
        self.url.read().unwrap().clone()
    }

    pub fn state(&self) -> PageState {
        *self.state.lock().unwrap()
    }

    pub fn session(&self) -> &CdpSession {
        &self.session
    }

    fn set_state(&self, next: PageState) {
        let mut state = self.state.lock().unwrap();
        if *state != PageState::Closed {
            *state = next;
        }
    }

    fn client(&self) -> Result<Arc<Client>> {
        self.client.upgrade().ok_or(Error::ClientClosed)
    }

    pub(crate) fn max_wait(&self) -> u64 {
        self.client
            .upgrade()
            .map(|client| client.config().max_wait_time)
            .unwrap_or(30)
    }

    fn report(&self, task: &str, err: &Error) {
        error!(page = %self.id, task, error = %err, "operation failed");
        if let Some(client) = self.client.upgrade() {
            client
                .telemetry()
                .log(LogLevel::Error, task, &err.to_string(), None);
        }
    }

    /// Best-effort frame push to the remote display; failures swallowed
    pub async fn refresh_frame(&self) {
        let Some(client) = self.client.upgrade() else {
            return;
        };
        if let Ok(bytes) = read::full_screenshot(&self.session).await {
            let _ = client
                .frames()
                .push_frame(&client.options().domain, &bytes)
                .await;
        }
    }

    fn apply_cookie_expiry(expires: f64) -> f64 {
        if expires < 0.0 {
            (chrono::Utc::now()
                + chrono::Duration::days(super::client::COOKIE_EXPIRY_DAYS))
            .timestamp() as f64
        } else {
            expires
        }
    }

    async fn apply_restored_cookies(&self) -> Result<()> {
        let Some(client) = self.client.upgrade() else {
            return Ok(());
        };
        for record in client.restored_cookies() {
            self.session
                .set_cookie(&crate::cdp::types::SetCookieParams {
                    name: record.name,
                    value: record.value,
                    domain: record.domain,
                    path: None,
                    expires: Some(Self::apply_cookie_expiry(record.expires)),
                    http_only: true,
                })
                .await?;
        }
        Ok(())
    }

    /// Navigate and wait until the body is present
    pub async fn load(&self, url: &str) -> Result<()> {
        info!(page = %self.id, %url, "load");
        self.set_state(PageState::Navigating);
        *self.url.write().unwrap() = url.to_string();
        let outcome = async {
            self.apply_restored_cookies().await?;
            self.session.navigate(url).await?;
            self.wait_body().await
        }
        .await;
        match outcome {
            Ok(()) => {
                self.set_state(PageState::Ready);
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report(&format!("load:{}", url), &err);
                Err(err)
            }
        }
    }

    async fn wait_body(&self) -> Result<()> {
        let selector = Selector::new("body", false).with_timeout_secs(self.max_wait());
        wait_for(&self.session, &selector, &Predicate::Present).await?;
        Ok(())
    }

    /// Open (or reload) a page by ID
    pub async fn open(&self, id: &str, url: &str) -> Result<Arc<Page>> {
        info!(page = %self.id, %url, "open");
        let client = self.client()?;
        match client.page_by(id) {
            Some(existing) => {
                existing.load(url).await?;
                Ok(existing)
            }
            None => {
                let page = Page::create(&client, id).await?;
                page.load(url).await?;
                Ok(page)
            }
        }
    }

    /// All elements matching the selector
    pub async fn selects(
        self: &Arc<Self>,
        sel: &str,
        timeout_secs: u64,
        must_visible: bool,
    ) -> Result<Vec<Element>> {
        info!(page = %self.id, sel, timeout_secs, must_visible, "select");
        let mut selector = Selector::new(sel, true).with_timeout_secs(timeout_secs);
        if timeout_secs > 0 {
            selector = selector.scrolled();
        }
        let predicate = if must_visible {
            Predicate::Visible
        } else {
            Predicate::Present
        };
        match wait_for(&self.session, &selector, &predicate).await {
            Ok(nodes) => {
                info!(page = %self.id, sel, count = nodes.len(), "selected");
                Ok(nodes
                    .into_iter()
                    .enumerate()
                    .map(|(index, node)| Element::new(index, node, Arc::clone(self)))
                    .collect())
            }
            Err(err) => {
                self.report(sel, &err);
                Err(err)
            }
        }
    }

    /// First element matching the selector
    pub async fn select(
        self: &Arc<Self>,
        sel: &str,
        timeout_secs: u64,
        must_visible: bool,
    ) -> Result<Element> {
        let mut elements = self.selects(sel, timeout_secs, must_visible).await?;
        if elements.is_empty() {
            let err = Error::not_found(sel);
            self.report(sel, &err);
            return Err(err);
        }
        Ok(elements.remove(0))
    }

    async fn wait_with(&self, task: &str, sel: &str, selector: Selector, predicate: Predicate) -> Result<()> {
        match wait_for(&self.session, &selector, &predicate).await {
            Ok(_) => {
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report(&format!("{}:{}", task, sel), &err);
                Err(err)
            }
        }
    }

    pub async fn wait_visible(&self, sel: &str, secs: u64) -> Result<()> {
        info!(page = %self.id, sel, secs, "wait visible");
        let selector = Selector::new(sel, false).with_timeout_secs(secs).scrolled();
        self.wait_with("WaitVisible", sel, selector, Predicate::Visible).await
    }

    pub async fn wait_not_visible(&self, sel: &str, secs: u64) -> Result<()> {
        info!(page = %self.id, sel, secs, "wait not visible");
        let selector = Selector::new(sel, false).with_timeout_secs(secs);
        self.wait_with("WaitNotVisible", sel, selector, Predicate::NotVisible).await
    }

    pub async fn wait_not_present(&self, sel: &str, secs: u64) -> Result<()> {
        info!(page = %self.id, sel, secs, "wait not present");
        let selector = Selector::new(sel, false).with_timeout_secs(secs);
        self.wait_with("WaitNotPresent", sel, selector, Predicate::NotPresent).await
    }

    pub async fn wait_more_than(&self, sel: &str, count: usize) -> Result<()> {
        info!(page = %self.id, sel, count, "wait more than");
        let selector = Selector::new(sel, true).with_timeout_secs(self.max_wait());
        self.wait_with("WaitMoreThan", sel, selector, Predicate::CountAtLeast(count)).await
    }

    pub async fn wait_content_changed(&self, sel: &str, old_html: &str) -> Result<()> {
        info!(page = %self.id, sel, "wait content changed");
        let selector = Selector::new(sel, false).with_timeout_secs(self.max_wait());
        self.wait_with(
            "WaitChanged",
            sel,
            selector,
            Predicate::ContentChanged(old_html.to_string()),
        )
        .await
    }

    /// Wait for the image's `src` to be non-empty and record it into the
    /// caller's map under the selector key
    pub async fn image_ready(&self, sel: &str, values: &mut HashMap<String, String>) -> Result<()> {
        info!(page = %self.id, sel, "image ready");
        let selector = Selector::new(sel, false).with_timeout_secs(self.max_wait()).scrolled();
        match wait_for(
            &self.session,
            &selector,
            &Predicate::AttributeReady("src".to_string()),
        )
        .await
        {
            Ok(nodes) => {
                for node in &nodes {
                    values.insert(sel.to_string(), node.attribute("src").unwrap_or_default());
                }
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report(&format!("imageReady:{}", sel), &err);
                Err(err)
            }
        }
    }

    /// Wait for the image's `src` to differ from the recorded value, then
    /// update the record
    pub async fn image_changed(&self, sel: &str, values: &mut HashMap<String, String>) -> Result<()> {
        info!(page = %self.id, sel, "image changed");
        let baseline = values.get(sel).cloned().unwrap_or_default();
        let selector = Selector::new(sel, false).with_timeout_secs(self.max_wait()).scrolled();
        match wait_for(
            &self.session,
            &selector,
            &Predicate::AttributeChanged {
                name: "src".to_string(),
                baseline,
            },
        )
        .await
        {
            Ok(nodes) => {
                if let Some(node) = nodes.first() {
                    values.insert(sel.to_string(), node.attribute("src").unwrap_or_default());
                }
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report(&format!("imageChanged:{}", sel), &err);
                Err(err)
            }
        }
    }

    async fn first_visible_node(&self, sel: &str) -> Result<Arc<crate::dom::Node>> {
        let selector = Selector::new(sel, false)
            .with_timeout_secs(self.max_wait())
            .scrolled();
        let nodes = wait_for(&self.session, &selector, &Predicate::Visible).await?;
        nodes.into_iter().next().ok_or_else(|| Error::not_found(sel))
    }

    async fn first_node(&self, sel: &str) -> Result<Arc<crate::dom::Node>> {
        let selector = Selector::new(sel, false).with_timeout_secs(self.max_wait());
        let nodes = wait_for(&self.session, &selector, &Predicate::Present).await?;
        nodes.into_iter().next().ok_or_else(|| Error::not_found(sel))
    }

    /// Wait visible, click the center, then settle for `settle_ms`
    pub async fn click(&self, sel: &str, settle_ms: u64) -> Result<()> {
        info!(page = %self.id, sel, "click");
        let outcome = async {
            let node = self.first_visible_node(sel).await?;
            input::click_node(&self.session, &node).await
        }
        .await;
        tokio::time::sleep(Duration::from_millis(settle_ms)).await;
        match outcome {
            Ok(()) => {
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report(&format!("click:{}", sel), &err);
                Err(err)
            }
        }
    }

    pub async fn send_keys(&self, sel: &str, value: &str) -> Result<()> {
        info!(page = %self.id, sel, "send keys");
        let outcome = async {
            let node = self.first_visible_node(sel).await?;
            input::send_keys_node(&self.session, &node, value).await
        }
        .await;
        self.after("sendKeys", sel, outcome).await
    }

    pub async fn set_value(&self, sel: &str, value: &str) -> Result<()> {
        info!(page = %self.id, sel, "set value");
        let outcome = async {
            let node = self.first_node(sel).await?;
            input::set_js_attribute(&self.session, &node, "value", serde_json::json!(value)).await
        }
        .await;
        self.after("setValue", sel, outcome).await
    }

    pub async fn mouse_drag(&self, sel: &str, offset_x: f64) -> Result<()> {
        info!(page = %self.id, sel, offset_x, "mouse drag");
        let outcome = async {
            let node = self.first_visible_node(sel).await?;
            input::mouse_drag_node(&self.session, &node, offset_x).await
        }
        .await;
        self.after("mouseDrag", sel, outcome).await
    }

    pub async fn mouse_over(&self, sel: &str) -> Result<()> {
        info!(page = %self.id, sel, "mouse over");
        let outcome = async {
            let node = self.first_visible_node(sel).await?;
            input::mouse_over_node(&self.session, &node).await
        }
        .await;
        self.after("mouseOver", sel, outcome).await
    }

    pub async fn scroll_into_view(&self, sel: &str) -> Result<()> {
        info!(page = %self.id, sel, "scroll into view");
        let outcome = async {
            let node = self.first_node(sel).await?;
            input::scroll_into_view(&self.session, &node).await
        }
        .await;
        self.after("scrollIntoView", sel, outcome).await
    }

    pub async fn upload(&self, sel: &str, file: &str) -> Result<()> {
        info!(page = %self.id, sel, file, "upload");
        let outcome = async {
            let node = self.first_node(sel).await?;
            input::upload_files(&self.session, &node, &[file.to_string()]).await
        }
        .await;
        self.after("upload", sel, outcome).await
    }

    async fn after(&self, task: &str, sel: &str, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report(&format!("{}:{}", task, sel), &err);
                Err(err)
            }
        }
    }

    pub async fn text(&self, sel: &str) -> Result<String> {
        info!(page = %self.id, sel, "read text");
        let node = self.first_node(sel).await?;
        read::inner_text(&self.session, &node).await
    }

    pub async fn value(&self, sel: &str) -> Result<String> {
        info!(page = %self.id, sel, "read value");
        let node = self.first_node(sel).await?;
        read::input_value(&self.session, &node).await
    }

    /// Computed style values for the requested property names
    pub async fn styles(&self, sel: &str, names: &[String]) -> Result<HashMap<String, String>> {
        let node = self.first_visible_node(sel).await?;
        read::computed_styles(&self.session, &node, names).await
    }

    pub async fn client_rect(&self, sel: &str) -> Result<ClientRect> {
        let node = self.first_node(sel).await?;
        read::node_client_rect(&self.session, &node).await
    }

    /// Click a link that starts a download and wait for its completion,
    /// returning the downloaded file's path
    pub async fn click_down(&self, sel: &str, timeout_secs: u64) -> Result<PathBuf> {
        info!(page = %self.id, sel, "click and download");
        let client = self.client()?;
        let download_dir = client.config().download_dir.clone();

        let (sender, receiver) = oneshot::channel();
        *self.pending_download.lock().unwrap() = Some(sender);

        self.session.set_download_behavior(&download_dir).await?;
        self.click(sel, 0).await?;

        match tokio::time::timeout(Duration::from_secs(timeout_secs), receiver).await {
            Ok(Ok(guid)) => {
                info!(page = %self.id, %guid, "download finished");
                Ok(PathBuf::from(download_dir).join(guid))
            }
            _ => {
                self.pending_download.lock().unwrap().take();
                let err = Error::timeout(format!("download `{}`", sel));
                self.report(sel, &err);
                Err(err)
            }
        }
    }

    /// Evaluate a script; a thrown exception is an error
    pub async fn inject_script(&self, script: &str) -> Result<()> {
        match self.session.evaluate(script).await {
            Ok(_) => {
                self.refresh_frame().await;
                Ok(())
            }
            Err(err) => {
                self.report("injectScript", &err);
                Err(err)
            }
        }
    }

    /// Read a page-global variable as JSON text
    pub async fn read_script_var(&self, name: &str) -> Result<String> {
        let expression = format!(
            "JSON.stringify({}, (key, value) => value ? value : undefined)",
            name
        );
        match self.session.evaluate(&expression).await {
            Ok(object) => Ok(object
                .value
                .as_ref()
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string()),
            Err(err) => {
                self.report(&format!("readScriptVar:{}", name), &err);
                Err(err)
            }
        }
    }

    /// Outer HTML of the whole document
    pub async fn html(&self) -> Result<String> {
        let selector = Selector::js_path("document");
        let node = crate::query::resolve::resolve_one(&self.session, &selector).await?;
        self.session.get_outer_html(node.node_id()).await
    }

    pub async fn save_html(&self, path: &std::path::Path) -> Result<()> {
        info!(page = %self.id, path = %path.display(), "save html");
        let content = self.html().await?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Full-viewport JPEG, base64-encoded
    pub async fn screenshot(&self) -> Result<String> {
        Ok(BASE64.encode(self.screenshot_bytes().await?))
    }

    pub async fn screenshot_bytes(&self) -> Result<Vec<u8>> {
        read::full_screenshot(&self.session).await
    }

    /// Open a URL in a scratch page, screenshot it, close it
    pub async fn down_image(&self, url: &str) -> Result<String> {
        let page = self.open("DownImage", url).await?;
        let shot = page.screenshot_bytes().await;
        page.close();
        match shot {
            Ok(bytes) => Ok(BASE64.encode(bytes)),
            Err(err) => {
                self.report(&format!("downImage:{}", url), &err);
                Err(err)
            }
        }
    }

    /// Wait for a target whose URL becomes non-empty and bind it as a new
    /// page
    pub async fn wait_new_page(&self) -> Result<Arc<Page>> {
        let client = self.client()?;
        let (sender, receiver) = oneshot::channel();
        *self.pending_new_target.lock().unwrap() = Some(sender);

        let (target_id, url) =
            match tokio::time::timeout(Duration::from_secs(self.max_wait()), receiver).await {
                Ok(Ok(found)) => found,
                _ => {
                    self.pending_new_target.lock().unwrap().take();
                    let err = Error::timeout("no new page appeared");
                    self.report("waitNewPage", &err);
                    return Err(err);
                }
            };

        let browser = CdpSession::new(client.transport());
        let session_id = browser.attach_to_target(&target_id).await?;
        let page = Page::bind(&client, &uuid::Uuid::new_v4().to_string(), session_id, url).await?;
        page.wait_body().await?;
        page.set_state(PageState::Ready);
        info!(page = %page.id, url = %page.url(), "new page bound");
        Ok(page)
    }

    /// Cancel the browsing context without touching the client list
    pub fn cancel(&self) {
        self.set_state(PageState::Closed);
        self.cancel.cancel();
    }

    /// Close the page and remove it from the client's list
    pub fn close(&self) {
        info!(page = %self.id, "close");
        self.cancel();
        if let Some(client) = self.client.upgrade() {
            client.remove_page(&self.id);
        }
    }
}
