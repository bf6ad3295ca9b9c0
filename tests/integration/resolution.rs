//! Manifest loading and bundle resolution through the public API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use kitchen_proxy::cache::Cache;
use kitchen_proxy::resolver::{ResolutionRequest, Resolver};
use kitchen_proxy::symbols::load_symbol_table;
use kitchen_proxy::test_utils::{DepsTree, init_test_logging};

async fn resolver(tree: &DepsTree) -> Result<Resolver> {
    let deps = tree.deps_section();
    let table = load_symbol_table(&deps).await?;
    Ok(Resolver::new(Arc::new(table), deps.bootstrap))
}

#[tokio::test]
async fn test_single_symbol_from_manifest() -> Result<()> {
    init_test_logging(None);
    let tree = DepsTree::new();
    let resolver = resolver(&tree).await?;

    let result = resolver.resolve(&ResolutionRequest::new(["a.B"]));
    assert_eq!(result.files, vec!["base.js", "debug/logger.js", "a.js"]);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.code(), "// base.js\n// debug/logger.js\n// a.js\n");
    Ok(())
}

#[tokio::test]
async fn test_unknown_symbol_keeps_bootstrap() -> Result<()> {
    let tree = DepsTree::new();
    let resolver = resolver(&tree).await?;

    let response = resolver.resolve(&ResolutionRequest::new(["x.Unknown"])).to_response();
    assert_eq!(response.code, "// base.js\n// debug/logger.js\n");
    assert_eq!(response.errors, vec!["x.Unknown is not exist."]);
    Ok(())
}

#[tokio::test]
async fn test_cycle_and_dependency_order() -> Result<()> {
    let tree = DepsTree::new();
    let resolver = resolver(&tree).await?;

    let result = resolver.resolve(&ResolutionRequest::new(["widget.Widget", "pong"]));
    assert_eq!(
        result.files,
        vec!["base.js", "debug/logger.js", "ping.js", "pong.js", "dom.js", "widget.js"]
    );
    Ok(())
}

#[tokio::test]
async fn test_permutations_share_one_cache_entry() -> Result<()> {
    let tree = DepsTree::new();
    let resolver = resolver(&tree).await?;
    let cache = Cache::in_memory(64);
    let ttl = Duration::from_secs(60);

    let first = resolver
        .resolve_cached(&cache, &ResolutionRequest::new(["widget.Widget", "a.B", "a.B"]), ttl)
        .await;
    let second =
        resolver.resolve_cached(&cache, &ResolutionRequest::new(["a.B", "widget.Widget"]), ttl).await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats().entries, 1);
    Ok(())
}
