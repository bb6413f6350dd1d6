//! Thread-local cache of compiled regex patterns
//!
//! The [`crate::combinator::re`] adapter compiles its pattern through this
//! cache, so a parser rebuilt in a loop never recompiles. Thread-local
//! storage keeps access lock-free; each thread warms its own cache.
//!
//! ```
//! use combinol::regex_cache::{get_or_compile, stats, clear_cache};
//!
//! clear_cache();
//! let _ = get_or_compile("[a-z]+"); // compiles
//! let _ = get_or_compile("[a-z]+"); // cached
//! let s = stats();
//! assert_eq!((s.hits, s.misses), (1, 1));
//! ```

use std::cell::RefCell;

use hashbrown::HashMap;
use regex::Regex;

/// Hit/miss counters for the current thread's cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: usize,
    /// Lookups that compiled (or failed to compile) the pattern.
    pub misses: usize,
    /// Patterns currently cached.
    pub size: usize,
}

struct CacheState {
    patterns: HashMap<String, Regex, ahash::RandomState>,
    hits: usize,
    misses: usize,
}

thread_local! {
    static CACHE: RefCell<CacheState> = RefCell::new(CacheState {
        patterns: HashMap::default(),
        hits: 0,
        misses: 0,
    });
}

/// Fetch a compiled pattern, compiling and caching on first sight.
/// `None` when the pattern is invalid.
#[inline]
pub fn get_or_compile(pattern: &str) -> Option<Regex> {
    CACHE.with(|cache| {
        let mut state = cache.borrow_mut();
        if let Some(regex) = state.patterns.get(pattern) {
            let regex = regex.clone();
            state.hits += 1;
            return Some(regex);
        }
        state.misses += 1;
        match Regex::new(pattern) {
            Ok(regex) => {
                state.patterns.insert(pattern.to_string(), regex.clone());
                Some(regex)
            }
            Err(_) => None,
        }
    })
}

/// Drop every cached pattern and reset the counters.
pub fn clear_cache() {
    CACHE.with(|cache| {
        let mut state = cache.borrow_mut();
        state.patterns.clear();
        state.hits = 0;
        state.misses = 0;
    });
}

/// Counters and size for the current thread.
pub fn stats() -> CacheStats {
    CACHE.with(|cache| {
        let state = cache.borrow();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            size: state.patterns.len(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_once() {
        clear_cache();
        assert!(get_or_compile("[0-9]+").is_some());
        assert!(get_or_compile("[0-9]+").is_some());
        let s = stats();
        assert_eq!(s.misses, 1);
        assert_eq!(s.hits, 1);
        assert_eq!(s.size, 1);
    }

    #[test]
    fn test_invalid_pattern_is_none() {
        clear_cache();
        assert!(get_or_compile("[unclosed").is_none());
        assert_eq!(stats().size, 0);
    }

    #[test]
    fn test_distinct_patterns_accumulate() {
        clear_cache();
        let _ = get_or_compile("a+");
        let _ = get_or_compile("b+");
        assert_eq!(stats().size, 2);
    }
}
