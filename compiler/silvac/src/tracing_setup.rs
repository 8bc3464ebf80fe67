//! Tracing initialisation for the driver.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber if `RUST_LOG` is set.
///
/// `SILVERA_LOG_TREE=1` renders spans as an indented tree instead of flat
/// lines. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var("SILVERA_LOG_TREE").is_ok_and(|v| v == "1");
        let registry = tracing_subscriber::registry().with(filter);
        if tree {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
