//! Capability traits for the collaborators the cache calls out to.
//!
//! Plain async closures implement [`Disposer`] and [`Loader`] directly.

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by asynchronous hooks.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

// == Disposer ==
/// Releases whatever external resource is tied to a removed value.
///
/// Invoked once per removal on a background task. Errors are logged with
/// the key and never reach the operation that removed the entry.
pub trait Disposer<V>: Send + Sync + 'static {
    fn dispose(&self, key: String, value: V) -> BoxFuture<anyhow::Result<()>>;
}

impl<V, F, Fut> Disposer<V> for F
where
    F: Fn(String, V) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn dispose(&self, key: String, value: V) -> BoxFuture<anyhow::Result<()>> {
        Box::pin(self(key, value))
    }
}

// == Loader ==
/// Produces the value for a key during warmup.
pub trait Loader<V>: Send + Sync + 'static {
    fn load(&self, key: String) -> BoxFuture<anyhow::Result<V>>;
}

impl<V, F, Fut> Loader<V> for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
{
    fn load(&self, key: String) -> BoxFuture<anyhow::Result<V>> {
        Box::pin(self(key))
    }
}

// == Compressor ==
/// Compression extension point. No algorithm ships with the crate.
pub trait Compressor<V>: Send + Sync {
    /// Returns the replacement value and its estimated size, or `None` to
    /// store the value as supplied.
    fn compress(&self, value: &V, size_bytes: usize) -> Option<(V, usize)>;

    /// Restores a value previously produced by `compress`.
    fn decompress(&self, stored: &V) -> anyhow::Result<V>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closures_are_hooks() {
        let disposer = |key: String, _value: u8| async move {
            if key == "bad" {
                anyhow::bail!("cannot release {key}");
            }
            Ok(())
        };
        assert!(disposer.dispose("ok".to_string(), 1).await.is_ok());
        assert!(disposer.dispose("bad".to_string(), 1).await.is_err());

        let loader = |key: String| async move { Ok::<_, anyhow::Error>(key.len()) };
        assert_eq!(loader.load("four".to_string()).await.unwrap(), 4);
    }
}
