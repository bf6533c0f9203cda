use std::future::Future;

/// Bounded retry over an async operation.
///
/// `op` receives the attempt index and reports `Ok(Some(value))` when done,
/// `Ok(None)` to request another attempt, or `Err` to abort. Exhausting the
/// budget yields `Ok(None)` so callers decide how to surface it.
pub async fn bounded<T, E, F, Fut>(max_attempts: usize, mut op: F) -> Result<Option<T>, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    for attempt in 0..max_attempts {
        if let Some(value) = op(attempt).await? {
            return Ok(Some(value));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_first_accepted_value() {
        let result: Result<Option<usize>, ()> =
            bounded(5, |attempt| async move { Ok((attempt == 2).then_some(attempt)) }).await;
        assert_eq!(result, Ok(Some(2)));
    }

    #[tokio::test]
    async fn exhausts_after_budget() {
        let mut calls = 0;
        let result: Result<Option<usize>, ()> = bounded(4, |_| {
            calls += 1;
            async { Ok(None) }
        })
        .await;
        assert_eq!(result, Ok(None));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn aborts_on_error() {
        let result: Result<Option<usize>, &str> = bounded(3, |attempt| async move {
            if attempt == 1 {
                Err("boom")
            } else {
                Ok(None)
            }
        })
        .await;
        assert_eq!(result, Err("boom"));
    }
}
