use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use concilio_core::{levenshtein_distance, normalize_description, SimilarityKind};

/// Abstraction over a description similarity backend.
///
/// Implementations must be symmetric, deterministic, return a value in
/// `[0.0, 1.0]`, and return `0.0` when either normalized text is empty.
pub trait SimilarityProvider: Send + Sync {
    fn similarity(&self, text_a: &str, text_b: &str) -> f64;
}

impl<T: SimilarityProvider + ?Sized> SimilarityProvider for Box<T> {
    fn similarity(&self, text_a: &str, text_b: &str) -> f64 {
        (**self).similarity(text_a, text_b)
    }
}

// ── Exact (default, always available) ─────────────────────────────────────────

/// 1.0 when the normalized texts are equal, otherwise 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSimilarity;

impl SimilarityProvider for ExactSimilarity {
    fn similarity(&self, text_a: &str, text_b: &str) -> f64 {
        let a = normalize_description(text_a);
        let b = normalize_description(text_b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            1.0
        } else {
            0.0
        }
    }
}

// ── Lexical backends ──────────────────────────────────────────────────────────

/// `1 - edit_distance / max_len` over normalized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinSimilarity;

impl SimilarityProvider for LevenshteinSimilarity {
    fn similarity(&self, text_a: &str, text_b: &str) -> f64 {
        let a = normalize_description(text_a);
        let b = normalize_description(text_b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let max_len = a.chars().count().max(b.chars().count());
        1.0 - (levenshtein_distance(&a, &b) as f64 / max_len as f64)
    }
}

/// Jaccard index over the sets of normalized words.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlapSimilarity;

impl SimilarityProvider for TokenOverlapSimilarity {
    fn similarity(&self, text_a: &str, text_b: &str) -> f64 {
        let a = normalize_description(text_a);
        let b = normalize_description(text_b);
        let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
        let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0.0;
        }

        let shared = tokens_a.intersection(&tokens_b).count();
        let total = tokens_a.union(&tokens_b).count();
        shared as f64 / total as f64
    }
}

// ── Memoization ───────────────────────────────────────────────────────────────

/// Memoizes another provider by normalized text pair. The cache only saves
/// work: a miss, or a poisoned lock, computes the real value.
///
/// Entries are never evicted. Memory grows with the number of distinct
/// description pairs scored over the cache's lifetime; call
/// [`CachedSimilarity::clear`] or drop it to release them.
pub struct CachedSimilarity<S: SimilarityProvider> {
    inner: S,
    cache: Mutex<HashMap<(String, String), f64>>,
}

impl<S: SimilarityProvider> CachedSimilarity<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl<S: SimilarityProvider> SimilarityProvider for CachedSimilarity<S> {
    fn similarity(&self, text_a: &str, text_b: &str) -> f64 {
        let a = normalize_description(text_a);
        let b = normalize_description(text_b);
        // Symmetric key: (x, y) and (y, x) share an entry.
        let key = if a <= b { (a, b) } else { (b, a) };

        if let Ok(cache) = self.cache.lock() {
            if let Some(&hit) = cache.get(&key) {
                return hit;
            }
        }

        let value = self.inner.similarity(&key.0, &key.1);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
        value
    }
}

/// Builds the provider named in configuration.
pub fn provider_for(kind: SimilarityKind, cached: bool) -> Box<dyn SimilarityProvider> {
    match (kind, cached) {
        (SimilarityKind::Exact, false) => Box::new(ExactSimilarity),
        (SimilarityKind::Exact, true) => Box::new(CachedSimilarity::new(ExactSimilarity)),
        (SimilarityKind::Levenshtein, false) => Box::new(LevenshteinSimilarity),
        (SimilarityKind::Levenshtein, true) => {
            Box::new(CachedSimilarity::new(LevenshteinSimilarity))
        }
        (SimilarityKind::TokenOverlap, false) => Box::new(TokenOverlapSimilarity),
        (SimilarityKind::TokenOverlap, true) => {
            Box::new(CachedSimilarity::new(TokenOverlapSimilarity))
        }
    }
}
