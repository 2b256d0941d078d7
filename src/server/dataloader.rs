use std::collections::HashMap;
use std::fmt::Debug;
use std::future::poll_fn;
use std::hash::Hash;
use std::pin::{Pin, pin};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Poll, Waker};

use tracing::debug;

pub type BatchFuture<K, V> = Pin<Box<dyn Future<Output = HashMap<K, V>> + Send + 'static>>;

pub trait BatchLoader {
    type K: Hash + Eq + Clone + Debug + Send + 'static;
    type V: Clone + Send + 'static;

    /// Loads all `keys` at once. The returned map must contain every key,
    /// otherwise the resolvers waiting on a missing key never complete.
    fn load_batch(&mut self, keys: Vec<Self::K>) -> BatchFuture<Self::K, Self::V>;
}

enum Entry<V> {
    Requested(Vec<Waker>),
    Ready(V),
}

struct LoaderInner<B: BatchLoader> {
    values: HashMap<B::K, Entry<B::V>>,
    pending_keys: HashMap<B::K, Vec<Waker>>,
    load_batch: B,
}

/// Per-request batching cache.
///
/// Resolvers call [`DataLoader::load`], which parks them until the key is
/// available. The request future is run inside [`DataLoader::wrap`], which
/// collects every key registered while the request is pending and resolves
/// them with one [`BatchLoader::load_batch`] call.
pub struct DataLoader<B: BatchLoader> {
    inner: Arc<Mutex<LoaderInner<B>>>,
}

impl<B: BatchLoader> Clone for DataLoader<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: BatchLoader> DataLoader<B> {
    pub fn new(load_batch: B) -> Self {
        let inner = LoaderInner {
            load_batch,
            values: Default::default(),
            pending_keys: Default::default(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderInner<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn load(&self, key: B::K) -> impl Future<Output = B::V> {
        poll_fn(move |cx| {
            let mut inner = self.lock();

            let wakers = match inner.values.get_mut(&key) {
                Some(Entry::Ready(v)) => {
                    return Poll::Ready(v.clone());
                }
                Some(Entry::Requested(wakers)) => wakers,
                None => inner.pending_keys.entry(key.clone()).or_insert_with(|| {
                    debug!(key = ?key, "queued for the next batch");
                    vec![]
                }),
            };

            wakers.push(cx.waker().clone());
            Poll::Pending
        })
    }

    /// Drops every cached value so the next `load` observes fresh data.
    ///
    /// Keys that are part of an in-flight batch are kept.
    pub fn clear(&self) {
        self.lock()
            .values
            .retain(|_, entry| matches!(entry, Entry::Requested(_)));
    }

    pub async fn wrap<O>(&self, fut: impl Future<Output = O>) -> O {
        let mut currently_loading: Option<BatchFuture<B::K, B::V>> = None;

        let mut fut = pin!(fut);
        poll_fn(move |cx| {
            if let Some(batch) = &mut currently_loading {
                match batch.as_mut().poll(cx) {
                    Poll::Ready(loaded) => {
                        let mut inner = self.lock();

                        for (k, v) in loaded {
                            if let Some(Entry::Requested(wakers)) =
                                inner.values.insert(k, Entry::Ready(v))
                            {
                                wakers.into_iter().for_each(Waker::wake);
                            }
                        }

                        currently_loading = None;
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            let res = fut.as_mut().poll(cx);
            if res.is_pending() {
                // Polling the request may have registered new keys.
                let mut inner = self.lock();

                if !inner.pending_keys.is_empty() {
                    let mut keys = Vec::with_capacity(inner.pending_keys.len());
                    for (k, wakers) in std::mem::take(&mut inner.pending_keys) {
                        keys.push(k.clone());
                        inner.values.insert(k, Entry::Requested(wakers));
                    }

                    debug!(keys = keys.len(), "starting batch");
                    currently_loading = Some(inner.load_batch.load_batch(keys));

                    // Poll again right away so the batch gets driven.
                    cx.waker().wake_by_ref();
                }
            }
            res
        })
        .await
    }
}
