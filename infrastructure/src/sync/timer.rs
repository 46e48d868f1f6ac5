use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Calls `f` every `period`, the first time right away, until `token` is cancelled.
pub async fn run_every<F, Fut>(period: Duration, token: CancellationToken, mut f: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => f().await,
        }
    }
}
