use std::sync::Arc;

use quarry::embedding::Embedder;
use quarry::routing::QueryRouter;
use quarry::vectordb::VectorStore;

pub struct HandlerState<E, S>
where
    E: Embedder,
    S: VectorStore + 'static,
{
    pub router: Arc<QueryRouter<E, S>>,
}

impl<E, S> Clone for HandlerState<E, S>
where
    E: Embedder,
    S: VectorStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<E, S> HandlerState<E, S>
where
    E: Embedder,
    S: VectorStore + 'static,
{
    pub fn new(router: QueryRouter<E, S>) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}
