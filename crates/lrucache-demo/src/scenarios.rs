//! Sample workloads

use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use lrucache::{CacheStats, LruCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Parameters of the multi-threaded scenario
pub struct ThreadsConfig {
    pub threads: u64,
    pub ops: u64,
    pub capacity: usize,
}

pub fn basic() -> Result<()> {
    println!("== Basic usage ==");
    let cache = LruCache::new(3)?;

    cache.put("A", 1);
    cache.put("B", 2);
    cache.put("C", 3);
    print!("{}", cache);

    println!("\nReading A...");
    let value = cache.try_get("A")?;
    println!("A = {}", value);
    print!("{}", cache);

    println!("\nAdding D (B is least recently used)...");
    if let Some((key, _)) = cache.put("D", 4) {
        println!("Evicted {}", key);
    }
    print!("{}", cache);

    Ok(())
}

pub fn api_responses() -> Result<()> {
    println!("\n== API response cache ==");
    let cache: LruCache<String, String> = LruCache::new(5)?;

    let requests = ["users", "posts", "users", "comments", "posts", "users", "settings"];
    for endpoint in requests {
        match cache.get(endpoint) {
            Some(cached) => println!("cache: {} -> {}", endpoint, cached),
            None => {
                let response = format!("Data from {}", endpoint);
                println!("api:   {} -> {}", endpoint, response);
                cache.put(endpoint.to_string(), response);
            }
        }
    }

    print!("\n{}", cache);
    Ok(())
}

pub fn images() -> Result<()> {
    println!("\n== Image cache ==");
    let cache: LruCache<u32, Vec<u8>> = LruCache::new(4)?;

    for id in 1..=6 {
        if let Some((evicted, bytes)) = cache.put(id, vec![0u8; 1024]) {
            info!(evicted, bytes = bytes.len(), "image dropped from cache");
        }
        println!("Loaded image #{}", id);
    }

    println!(
        "Size: {}/{}, images (most to least recent): {:?}",
        cache.len(),
        cache.capacity(),
        cache.keys()
    );
    println!("Evicted images 1 and 2 (oldest)");

    Ok(())
}

pub fn statistics(seed: Option<u64>, json: bool) -> Result<()> {
    println!("\n== Statistics ==");
    let cache: LruCache<u32, String> = LruCache::new(3)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..20 {
        let key = rng.gen_range(1..5);
        if cache.get(&key).is_none() {
            cache.put(key, format!("value {}", key));
        }
    }

    print_stats(&cache.stats(), json)
}

pub fn threads(config: &ThreadsConfig, json: bool) -> Result<()> {
    println!("\n== Multi-threaded access ==");
    let cache = Arc::new(LruCache::new(config.capacity)?);

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let ops = config.ops;
            thread::spawn(move || {
                for i in 0..ops {
                    let key = t * ops + i;
                    cache.put(key, i);
                    cache.get(&key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("worker thread panicked"))?;
    }

    println!("Entries in cache: {}", cache.len());
    if !cache.is_consistent() {
        warn!("cache structure inconsistent after concurrent run");
    }

    print_stats(&cache.stats(), json)
}

fn print_stats(stats: &CacheStats, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(stats)?;
        value["hit_rate"] = serde_json::json!(stats.hit_rate());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Hits: {}", stats.hits);
        println!("Misses: {}", stats.misses);
        println!("Hit Rate: {:.1}%", stats.hit_rate());
    }

    Ok(())
}
