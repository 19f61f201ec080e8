/// Storage key for the short-lived access credential
pub const ACCESS_CREDENTIAL_KEY: &str = "accessCredential";

/// Storage key for the long-lived renewal credential
pub const RENEWAL_CREDENTIAL_KEY: &str = "renewalCredential";

/// Default keyring service name
pub const DEFAULT_KEYRING_SERVICE: &str = "campus-auth";

pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
