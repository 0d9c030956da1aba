pub mod movies;
pub mod providers;
pub mod recommender;
pub mod retry;

pub use movies::MovieService;
pub use providers::{MovieProvider, TmdbProvider};
pub use recommender::Recommender;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
