use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::RwLock;
use tracing::warn;

pub const LOAD_ERROR_MESSAGE: &str = "Ошибка загрузки данных";

type LoadFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;
type LoadFn<T, E> = Box<dyn Fn() -> LoadFuture<T, E> + Send + Sync>;
type ErrorHook<E> = Box<dyn Fn(&E) + Send + Sync>;

struct LoaderState<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

/// Caches the result of one async load and tracks its progress
pub struct DataLoader<T, E> {
    load_fn: LoadFn<T, E>,
    initial: Option<T>,
    on_error: Option<ErrorHook<E>>,
    state: RwLock<LoaderState<T>>,
}

impl<T, E> DataLoader<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Display + 'static,
{
    pub fn new<F, Fut>(load_fn: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            load_fn: Box::new(move || Box::pin(load_fn())),
            initial: None,
            on_error: None,
            state: RwLock::new(LoaderState {
                data: None,
                loading: false,
                error: None,
            }),
        }
    }

    /// Value reported before the first load and after `reset`
    pub fn with_initial(mut self, initial: T) -> Self {
        self.state.get_mut().data = Some(initial.clone());
        self.initial = Some(initial);
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&E) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Cached value unless `force` or nothing loaded yet
    pub async fn load(&self, force: bool) -> Result<T, E> {
        {
            let mut state = self.state.write().await;
            if !force {
                if let Some(data) = &state.data {
                    return Ok(data.clone());
                }
            }
            state.loading = true;
            state.error = None;
        }

        let result = (self.load_fn)().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(data) => {
                state.data = Some(data.clone());
                Ok(data)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Data load failed");
                state.error = Some(if message.is_empty() {
                    LOAD_ERROR_MESSAGE.to_string()
                } else {
                    message
                });
                if let Some(hook) = &self.on_error {
                    hook(&e);
                }
                Err(e)
            }
        }
    }

    pub async fn data(&self) -> Option<T> {
        self.state.read().await.data.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.data = self.initial.clone();
        state.loading = false;
        state.error = None;
    }
}
