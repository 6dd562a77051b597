/// Application name
pub const APP_NAME: &str = "Parley";

/// Default base URL of the HTTP API server
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Default WebSocket endpoint for the realtime connection
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

/// Query parameter carrying a one-time credential after an external
/// identity provider redirects back to the application
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Capacity of the connection command channel
pub const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the connection notification channel
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the client event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
