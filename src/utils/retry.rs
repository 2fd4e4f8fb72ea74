//! Retry helper for filesystem writes

/// Run `op`, retrying exactly once when it fails. The second error wins.
pub fn retry_once<T, E, F>(what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
{
    match op() {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::warn!("{} failed ({}), retrying once", what, first);
            op()
        }
    }
}
