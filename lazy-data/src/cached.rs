use std::{pin::Pin, sync::Arc, sync::Weak};

use futures::Future;
use parking_lot::Mutex;

use tokio::sync::broadcast;
use tracing::debug;

pub type BoxFut<'a, O> = Pin<Box<dyn Future<Output = O> + Send + 'a>>;

// The in-flight deduplication follows fasterthanlime's request coalescing.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CachedError<E> {
    #[error("{0}")]
    Load(E),
    #[error("in-flight load died")]
    Died,
}

/// A value that is loaded at most once at a time and kept once loaded.
///
/// The first caller of [`Cached::get_cached`] spawns the load, everyone
/// arriving while it runs subscribes to its result. A value only becomes
/// visible once it is complete. A failed load stores nothing, the next
/// caller starts a fresh one.
#[derive(Clone, Debug)]
pub struct Cached<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<CachedInner<T, E>>>,
}

#[derive(Debug)]
struct CachedInner<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    value: Option<T>,
    inflight: Option<Weak<broadcast::Sender<Result<T, E>>>>,
}

impl<T, E> Cached<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CachedInner {
                value: None,
                inflight: None,
            })),
        }
    }

    pub async fn get_cached<F>(&self, f: F) -> Result<T, CachedError<E>>
    where
        F: FnOnce() -> BoxFut<'static, Result<T, E>>,
    {
        let mut rx = {
            let mut inner = self.inner.lock();

            if let Some(value) = inner.value.as_ref() {
                return Ok(value.clone());
            }

            if let Some(inflight) = inner.inflight.as_ref().and_then(Weak::upgrade) {
                debug!("Joining in-flight load");
                inflight.subscribe()
            } else {
                let (tx, rx) = broadcast::channel::<Result<T, E>>(1);
                let tx = Arc::new(tx);
                inner.inflight = Some(Arc::downgrade(&tx));
                let inner = self.inner.clone();

                let fut = f();

                tokio::spawn(async move {
                    let res = fut.await;

                    {
                        // only sync code in this block
                        let mut inner = inner.lock();
                        inner.inflight = None;

                        if let Ok(value) = &res {
                            inner.value = Some(value.clone());
                        }
                        let _ = tx.send(res);
                    }
                });
                rx
            }
        };

        // if we reached here, we're waiting for an in-flight request (we weren't
        // able to serve from cache)
        match rx.recv().await {
            Ok(res) => res.map_err(CachedError::Load),
            Err(_) => Err(CachedError::Died),
        }
    }

    pub fn try_get_sync(&self) -> Option<T> {
        self.inner.lock().value.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().value.is_some()
    }

    pub fn is_loading(&self) -> bool {
        let inner = self.inner.lock();
        inner
            .inflight
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some()
    }
}

impl<T, E> Default for Cached<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::empty()
    }
}
