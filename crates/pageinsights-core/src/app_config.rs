pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v16.0";
pub const DEFAULT_USER_AGENT: &str = "pageinsights/0.1 (page-analytics)";

#[derive(Clone)]
pub struct AppConfig {
    pub app_id: String,
    pub user_access_token: Option<String>,
    pub graph_base_url: String,
    pub graph_api_version: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_id", &self.app_id)
            .field(
                "user_access_token",
                &self.user_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("graph_base_url", &self.graph_base_url)
            .field("graph_api_version", &self.graph_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}
