//! Example demonstrating the SWR flow end to end: an immediate cached
//! snapshot, background revalidation, optimistic mutation and prefix
//! invalidation, all over a single in-memory adapter.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swr_loader::{CacheKey, ErrorMode, MemoryAdapter, Status, SwrCache, SwrOptions};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Article {
    slug: String,
    title: String,
}

async fn load_article(key: CacheKey) -> Result<Article, swr_loader::BoxError> {
    // Stand-in for a slow origin
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    let slug = key.segments().last().cloned().unwrap_or_default();
    Ok(Article {
        title: format!("Article '{}'", slug),
        slug,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let adapter = Arc::new(MemoryAdapter::new());
    let cache: SwrCache<Article> = SwrCache::builder(adapter)
        .before_set(|ctx| println!("revalidating key={}", ctx.cache_key))
        .build();

    let opts = SwrOptions {
        cache_key: CacheKey::new(["articles", "hello-world"]),
        max_age_ms: 10_000,
        on_error: ErrorMode::ServeStale,
    };

    // First call - nothing cached yet, the fresh side fetches
    let result = cache.swr(opts.clone(), load_article).await?;
    println!("cached snapshot: {:?}", result.cached); // None
    let fresh = result.fresh.await?.expect("fetch succeeded");
    println!("fresh: {:?} ({:?})", fresh.data, fresh.status);

    // Second call - served from cache, no fetch happens
    let result = cache.swr(opts.clone(), load_article).await?;
    println!("cached snapshot: {:?}", result.cached.as_ref().map(|s| &s.data));
    let fresh = result.fresh.await?.expect("still cached");
    assert_eq!(fresh.status, Status::Cached);

    // Optimistic update - the next read sees it without any fetch
    cache
        .mutate(
            &opts.cache_key,
            Article {
                slug: "hello-world".into(),
                title: "Hello, world (edited locally)".into(),
            },
        )
        .await?;

    let result = cache.swr(opts.clone(), load_article).await?;
    println!(
        "after mutate: {:?}",
        result.cached.as_ref().map(|s| &s.data.title)
    );
    result.fresh.await?;

    // Invalidate the whole namespace - payloads survive, but the next call
    // revalidates regardless of max-age
    cache.invalidate(&CacheKey::new(["articles"])).await?;

    let result = cache.swr(opts, load_article).await?;
    println!(
        "after invalidate, cached payload still serves: {:?}",
        result.cached.as_ref().map(|s| &s.data.title)
    );
    let fresh = result.fresh.await?.expect("refetched");
    assert_eq!(fresh.status, Status::Fresh);
    println!("refetched: {:?}", fresh.data);

    Ok(())
}
