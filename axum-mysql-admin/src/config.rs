//! Runtime limits for the admin backend

/// Page size used when the caller sends no usable `limit`
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Largest page the content browser will fetch in one request
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 500;

/// Configuration shared by every request handled by an [`crate::AdminService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminConfig {
    /// Page size applied when `limit` is absent or not a positive integer
    pub default_page_size: u64,

    /// Upper bound for `limit`; larger requests are clamped
    pub max_page_size: u64,
}

impl AdminConfig {
    /// Build a config, keeping both sizes positive and the default within the cap
    pub fn new(default_page_size: u64, max_page_size: u64) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            default_page_size: default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}
