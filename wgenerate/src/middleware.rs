//! Generic composition of cross-cutting generator wrappers.
//!
//! A layer is a factory that wraps one generator in another. `compose`
//! stacks a list of layers around a base generator so that the FIRST layer
//! in the list is the OUTERMOST at invocation time, e.g.
//! `compose(backend, vec![logging, retry, normalizing])` invokes logging,
//! then retry, then normalization, then the backend. Layers know nothing
//! about each other; capabilities a layer does not intercept delegate inward
//! through the [`Generator`](crate::Generator) accessor defaults.

use std::sync::Arc;

use crate::Generator;

pub type GeneratorLayer = Box<dyn Fn(Arc<dyn Generator>) -> Arc<dyn Generator> + Send + Sync>;

pub fn compose(base: Arc<dyn Generator>, layers: Vec<GeneratorLayer>) -> Arc<dyn Generator> {
    layers
        .into_iter()
        .rev()
        .fold(base, |inner, layer| layer(inner))
}

/// Builds an ad-hoc layer from a wrapping closure.
pub fn layer_fn<F>(wrap: F) -> GeneratorLayer
where
    F: Fn(Arc<dyn Generator>) -> Arc<dyn Generator> + Send + Sync + 'static,
{
    Box::new(wrap)
}
