use once_cell::sync::Lazy;
use std::future::Future;
use tokio::task::JoinError;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Runs `fut` on the shared Tokio runtime and resolves with its output.
/// The returned future can be awaited from the GLib main loop.
pub async fn run_on_runtime<T, Fut>(fut: Fut) -> Result<T, JoinError>
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    RUNTIME.spawn(fut).await
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
