//! Session state machine tying login, page selection and insights together.

use std::sync::Arc;

use pageinsights_core::{DateRange, Metric, Page, Profile};

use crate::auth::{LoginOutcome, SessionAuthenticator};
use crate::error::{AuthError, InsightsError, SessionError};
use crate::insights::{FetchOutcome, FetchStatus, InsightsFetcher, InsightsResult, MetricValue};
use crate::platform::GraphPlatform;

/// Observable session state, derived from what the session currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    AuthenticationFailed(AuthError),
    Authenticated,
    PageSelected,
    InsightsLoaded,
    InsightsFailed(InsightsError),
}

pub struct Session<P: ?Sized> {
    authenticator: SessionAuthenticator<P>,
    fetcher: InsightsFetcher<P>,
    login: Option<LoginOutcome>,
    auth_error: Option<AuthError>,
    selected: Option<Page>,
    range: DateRange,
}

impl<P: GraphPlatform + ?Sized> Session<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self {
            authenticator: SessionAuthenticator::new(Arc::clone(&platform)),
            fetcher: InsightsFetcher::new(platform),
            login: None,
            auth_error: None,
            selected: None,
            range: DateRange::default(),
        }
    }

    /// Logs in and stores the page list and profile.
    ///
    /// A fresh login drops any previous selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] if consent was declined or failed. The
    /// error also remains visible through [`Session::state`].
    pub async fn login(&mut self) -> Result<&LoginOutcome, SessionError> {
        self.selected = None;
        match self.authenticator.login().await {
            Ok(outcome) => {
                self.auth_error = None;
                Ok(&*self.login.insert(outcome))
            }
            Err(err) => {
                self.login = None;
                self.auth_error = Some(err.clone());
                Err(SessionError::Auth(err))
            }
        }
    }

    /// Selects a page from the login's page list and fetches its insights.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotAuthenticated`] before a successful login.
    /// - [`SessionError::UnknownPage`] if `page_id` is not in the page list;
    ///   the current selection is kept.
    /// - [`SessionError::Insights`] if the fetch failed.
    pub async fn select_page(&mut self, page_id: &str) -> Result<FetchOutcome, SessionError> {
        let login = self.login.as_ref().ok_or(SessionError::NotAuthenticated)?;
        let page = login
            .pages
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|p| p.id == page_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownPage(page_id.to_string()))?;

        tracing::debug!(page_id, page_name = %page.name, "page selected");
        self.selected = Some(page);
        self.refresh().await
    }

    /// Replaces the date range and re-fetches for the selected page.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Insights`] if the re-fetch failed.
    pub async fn set_date_range(&mut self, range: DateRange) -> Result<FetchOutcome, SessionError> {
        self.range = range;
        self.refresh().await
    }

    /// Re-runs the fetch for the current selection. Without a selection this
    /// is a no-op returning [`FetchOutcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Insights`] if the fetch failed.
    pub async fn refresh(&self) -> Result<FetchOutcome, SessionError> {
        let Some(page) = &self.selected else {
            return Ok(FetchOutcome::Skipped);
        };
        Ok(self
            .fetcher
            .fetch_insights(&page.id, &page.access_token, &self.range)
            .await?)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.login.is_none() {
            return match &self.auth_error {
                Some(err) => SessionState::AuthenticationFailed(err.clone()),
                None => SessionState::Unauthenticated,
            };
        }
        if self.selected.is_none() {
            return SessionState::Authenticated;
        }
        match self.fetcher.snapshot().status {
            FetchStatus::Loaded => SessionState::InsightsLoaded,
            FetchStatus::Failed(err) => SessionState::InsightsFailed(err),
            FetchStatus::Idle | FetchStatus::Loading => SessionState::PageSelected,
        }
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.login.as_ref().and_then(|l| l.profile.as_ref().ok())
    }

    /// Administered pages; empty when logged out or the list was unavailable.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.login
            .as_ref()
            .and_then(|l| l.pages.as_deref().ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn selected_page(&self) -> Option<&Page> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn date_range(&self) -> DateRange {
        self.range
    }

    /// The loaded result, only if it was produced for the selected page and
    /// the current date range.
    #[must_use]
    pub fn insights(&self) -> Option<InsightsResult> {
        let page = self.selected.as_ref()?;
        let snapshot = self.fetcher.snapshot();
        let key = snapshot.key.as_ref()?;
        if key.page_id == page.id
            && key.access_token == page.access_token
            && key.range == self.range
        {
            snapshot.result
        } else {
            None
        }
    }

    /// The four dashboard tiles, or `None` when no result is loaded for the
    /// current selection.
    #[must_use]
    pub fn tiles(&self) -> Option<Vec<(Metric, MetricValue)>> {
        self.insights().map(|r| r.tiles())
    }
}
