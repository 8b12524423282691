#![allow(dead_code)]

pub mod fixtures;

use std::sync::Once;

use object_tree::{Context, ContextRef, Registry, TreeOptions};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a compact subscriber once per test binary, filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer().compact())
            .try_init();
    });
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    fixtures::register(&mut registry);
    registry
}

pub fn context() -> ContextRef {
    context_with(TreeOptions::default())
}

pub fn context_with(options: TreeOptions) -> ContextRef {
    init_tracing();
    Context::with_options(registry(), options).shared()
}
