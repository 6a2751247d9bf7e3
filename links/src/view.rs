//! Rendering the first link's title.

use std::sync::Arc;

use links_client::{DummyLinksQuery, DummyLinksResponse, LoadState, PreloadHandle, Transport};
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

/// Shown until the links arrive.
pub const PLACEHOLDER: &str = "Loading";

/// Shown when the server returned no links.
pub const NO_LINKS: &str = "No links found";

/// What the view currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing has arrived yet.
    Loading,
    /// The title of the first link.
    Loaded(String),
    /// The query succeeded without returning any links.
    Empty,
}

impl ViewState {
    /// The state to show for a response.
    #[must_use]
    pub fn from_response(response: &DummyLinksResponse) -> Self {
        response
            .first_title()
            .map_or(Self::Empty, |title| Self::Loaded(title.to_string()))
    }
}

/// Render a state as the text shown to the user.
#[must_use]
pub fn render(state: &ViewState) -> String {
    match state {
        ViewState::Loading => PLACEHOLDER.to_string(),
        ViewState::Loaded(title) => format!("Link Title: {title}"),
        ViewState::Empty => NO_LINKS.to_string(),
    }
}

/// Displays the title of the first link.
///
/// The view can either load its own data with [`LinkTitleView::mount`] or read a query that was
/// preloaded before the view existed with [`LinkTitleView::read_preloaded`].
pub struct LinkTitleView {
    /// The current state, shared with the task loading it.
    state: Arc<watch::Sender<ViewState>>,
    /// Set while the view is mounted.
    mounted: Option<CancellationToken>,
    /// Resolves once the load started by `mount` has finished, successfully or not.
    finished: Option<oneshot::Receiver<()>>,
}

impl Default for LinkTitleView {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkTitleView {
    /// Create a view showing the placeholder.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(ViewState::Loading);
        Self {
            state: Arc::new(state),
            mounted: None,
            finished: None,
        }
    }

    /// Watch the view's state for changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Render the current state.
    #[must_use]
    pub fn render(&self) -> String {
        render(&self.state.borrow())
    }

    /// Start loading the links, the state is updated once they arrive.
    ///
    /// Mounting an already mounted view is a no-op.
    pub fn mount<T: Transport + Send + Sync + 'static>(&mut self, transport: Arc<T>) {
        if self.mounted.is_some() {
            return;
        }
        let state = Arc::clone(&self.state);
        // Dropped with the callback when the load ends, which also covers failures.
        let (finished, finished_receiver) = oneshot::channel();
        let token = links_client::fetch_on_mount::<DummyLinksQuery, _, _>(
            transport,
            links_client::Variables::new(),
            move |response, token| {
                // Teardown cancels while holding the same lock.
                state.send_if_modified(|state| {
                    if token.is_cancelled() {
                        return false;
                    }
                    *state = ViewState::from_response(&response);
                    true
                });
                let _ = finished.send(());
            },
        );
        self.mounted = Some(token);
        self.finished = Some(finished_receiver);
    }

    /// Wait for the load started by [`LinkTitleView::mount`] to finish.
    ///
    /// Returns straight away if the view isn't loading. A failed load leaves the view showing the
    /// placeholder.
    pub async fn finished(&mut self) {
        if let Some(finished) = self.finished.take() {
            let _ = finished.await;
        }
    }

    /// Stop accepting updates from a load started by [`LinkTitleView::mount`].
    ///
    /// No update lands after this returns, whichever thread the load finishes on.
    pub fn teardown(&mut self) {
        if let Some(token) = self.mounted.take() {
            self.state.send_if_modified(|_| {
                token.cancel();
                false
            });
        }
    }

    /// Read a preloaded query.
    ///
    /// A pending query shows the placeholder, a failed one is returned to the caller to report.
    pub fn read_preloaded(
        &self,
        handle: &PreloadHandle<DummyLinksResponse>,
    ) -> Result<ViewState, Arc<links_client::Error>> {
        let state = match handle.poll() {
            LoadState::Pending => ViewState::Loading,
            LoadState::Ready(response) => ViewState::from_response(&response),
            LoadState::Failed(error) => return Err(error),
        };
        self.state.send_replace(state.clone());
        Ok(state)
    }
}

impl Drop for LinkTitleView {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use links_client::{Error, Variables};
    use tokio::sync::Notify;

    use super::*;

    /// Answers every query with the same body once the gate has been opened.
    struct CannedTransport {
        body: serde_json::Value,
        gate: Arc<Notify>,
    }

    impl CannedTransport {
        fn new(body: serde_json::Value) -> (Arc<Self>, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            let transport = Arc::new(Self {
                body,
                gate: gate.clone(),
            });
            (transport, gate)
        }
    }

    impl Transport for CannedTransport {
        async fn send(
            &self,
            _query: &str,
            _variables: &Variables,
        ) -> Result<serde_json::Value, Error> {
            self.gate.notified().await;
            Ok(self.body.clone())
        }
    }

    fn example_body() -> serde_json::Value {
        serde_json::json!({"data": {"dummyLinks": [
            {"title": "Example", "address": "http://x", "user": {"name": "Bob"}}
        ]}})
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&ViewState::Loading), "Loading");
        assert_eq!(
            render(&ViewState::Loaded("Example".to_string())),
            "Link Title: Example"
        );
        assert_eq!(render(&ViewState::Empty), "No links found");
    }

    #[test]
    fn test_state_from_empty_response() {
        let response = DummyLinksResponse {
            dummy_links: vec![],
        };
        assert_eq!(ViewState::from_response(&response), ViewState::Empty);
    }

    #[tokio::test]
    async fn test_mount_renders_first_title() {
        let (transport, gate) = CannedTransport::new(example_body());
        let mut view = LinkTitleView::new();
        let mut state = view.subscribe();

        view.mount(transport);
        assert_eq!(view.render(), "Loading");

        gate.notify_one();
        state.changed().await.unwrap();
        assert_eq!(view.render(), "Link Title: Example");
    }

    #[tokio::test]
    async fn test_mount_empty_links() {
        let (transport, gate) =
            CannedTransport::new(serde_json::json!({"data": {"dummyLinks": []}}));
        let mut view = LinkTitleView::new();
        let mut state = view.subscribe();

        view.mount(transport);
        gate.notify_one();
        state.changed().await.unwrap();
        assert_eq!(view.state(), ViewState::Empty);
    }

    #[tokio::test]
    async fn test_late_response_after_teardown() {
        let (transport, gate) = CannedTransport::new(example_body());
        let mut view = LinkTitleView::new();
        let state = view.subscribe();

        view.mount(transport);
        view.teardown();
        gate.notify_one();
        view.finished().await;

        assert!(!state.has_changed().unwrap());
        assert_eq!(view.render(), "Loading");
    }

    #[tokio::test]
    async fn test_mount_failure_stays_loading() {
        let (transport, gate) =
            CannedTransport::new(serde_json::json!({"errors": [{"message": "down"}]}));
        let mut view = LinkTitleView::new();
        let state = view.subscribe();

        view.mount(transport);
        gate.notify_one();
        view.finished().await;

        assert!(!state.has_changed().unwrap());
        assert_eq!(view.render(), "Loading");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_update_after_teardown_across_threads() {
        let body = example_body();
        let mut torn_down = vec![];
        for _ in 0..200 {
            let (transport, gate) = CannedTransport::new(body.clone());
            let mut view = LinkTitleView::new();
            view.mount(transport);
            gate.notify_one();
            tokio::task::yield_now().await;
            view.teardown();
            // Marks whatever the view showed at teardown as seen.
            let state = view.subscribe();
            torn_down.push((view, state));
        }

        for (view, state) in &mut torn_down {
            view.finished().await;
            assert!(!state.has_changed().unwrap());
        }
    }

    #[tokio::test]
    async fn test_finished_without_mount() {
        let mut view = LinkTitleView::new();
        view.finished().await;
        assert_eq!(view.state(), ViewState::Loading);
    }

    #[tokio::test]
    async fn test_preloaded_handle() {
        let (transport, gate) = CannedTransport::new(example_body());
        let handle = links_client::preload::<DummyLinksQuery, _>(transport, Variables::new());
        let view = LinkTitleView::new();

        assert_eq!(view.read_preloaded(&handle).unwrap(), ViewState::Loading);
        assert_eq!(view.render(), "Loading");

        gate.notify_one();
        handle.wait().await.unwrap();
        assert_eq!(
            view.read_preloaded(&handle).unwrap(),
            ViewState::Loaded("Example".to_string())
        );
        assert_eq!(view.render(), "Link Title: Example");
    }

    #[tokio::test]
    async fn test_preloaded_failure_is_returned() {
        let (transport, gate) = CannedTransport::new(serde_json::json!({}));
        let handle = links_client::preload::<DummyLinksQuery, _>(transport, Variables::new());
        let view = LinkTitleView::new();

        gate.notify_one();
        assert!(handle.wait().await.is_err());
        let error = view.read_preloaded(&handle).unwrap_err();
        assert!(matches!(*error, Error::MissingData));
        assert_eq!(view.render(), "Loading");
    }
}
