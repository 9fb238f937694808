pub mod app_config;
pub mod http;
pub mod location;
pub mod request;
pub mod root;
pub mod storage;
pub mod stores;

pub use app_config::Config;
pub use http::HttpClient;
pub use location::Location;
pub use request::RequestController;
pub use root::RootStore;
pub use storage::{FileTokenStorage, MemoryTokenStorage, StorageError, TokenStorage};
pub use stores::{
    AccountStore, AuthStore, BookingsStore, CinemaDetail, CinemasStore, MovieDetail, MoviesStore,
    SessionsStore, StoreStatus,
};
