use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::info;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// The page the user is currently on, shared between the router and the HTTP client
#[derive(Debug)]
pub struct Location {
    path: RwLock<String>,
    redirects: AtomicUsize,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: RwLock::new(path.into()),
            redirects: AtomicUsize::new(0),
        }
    }

    pub async fn current(&self) -> String {
        self.path.read().await.clone()
    }

    pub async fn set(&self, path: impl Into<String>) {
        *self.path.write().await = path.into();
    }

    pub async fn is_auth_page(&self) -> bool {
        is_auth_path(&self.path.read().await)
    }

    /// Send the user to the login page unless they are already on an auth page.
    ///
    /// Returns whether a redirect happened.
    pub async fn redirect_to_login(&self) -> bool {
        let mut path = self.path.write().await;
        if is_auth_path(&path) {
            return false;
        }
        info!(from = %path.as_str(), "Redirecting to login");
        *path = LOGIN_PATH.to_string();
        self.redirects.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Number of forced login redirects so far
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

pub fn is_auth_path(path: &str) -> bool {
    path == LOGIN_PATH || path == REGISTER_PATH
}
