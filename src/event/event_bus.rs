use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::RwLock;

use anyhow::Result;
use log::error;

use crate::event::Event;
use crate::subscriber::Subscriber;

type AsyncCallback<E> =
    Box<dyn Fn(E) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;
type Callbacks = RwLock<HashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>>;

/// In-process publish/subscribe bus keyed by event type.
///
/// Dispatch is fire-and-forget on the ambient tokio runtime; `publish` must
/// be called from within one. Callback errors are logged, never propagated
/// to the publisher.
pub struct EventBus {
    callbacks: Callbacks,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    pub fn register_callback<E, F, Fut>(&self, callback: F) -> &Self
    where
        E: Event,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let type_id = TypeId::of::<E>();

        let wrapped: AsyncCallback<E> = Box::new(move |event| Box::pin(callback(event)));

        self.callbacks
            .write()
            .unwrap()
            .entry(type_id)
            .or_default()
            .push(Box::new(wrapped));
        self
    }

    pub fn register_subscriber<E, S>(&self, subscriber: Arc<S>) -> &Self
    where
        E: Event + Clone,
        S: Subscriber<E> + Send + Sync + 'static,
    {
        self.register_callback(move |event: E| {
            let s = subscriber.clone();
            async move { s.callback(event).await }
        })
    }

    pub fn publish<E>(&self, event: E)
    where
        E: Event + Clone,
    {
        let callbacks = self.callbacks.read().unwrap();

        if let Some(list) = callbacks.get(&TypeId::of::<E>()) {
            let mut futures = Vec::new();
            for boxed in list {
                if let Some(callback) = boxed.downcast_ref::<AsyncCallback<E>>() {
                    futures.push(callback(event.clone()));
                }
            }
            let event_name = event.event_name();
            tokio::spawn(async move {
                for result in futures::future::join_all(futures).await {
                    if let Err(e) = result {
                        error!("Error handling {event_name}: {e:?}");
                    }
                }
            });
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
