//! Search settings from positional arguments and environment variables.

use std::env;

use tracing::debug;

use crate::errors::ConfigError;

/// Default number of worker threads.
const DEFAULT_WORKER_THREADS: usize = 1;

/// Default upper bound on worker threads.
const DEFAULT_MAX_WORKER_THREADS: usize = 12;

/// Default upper bound on the tree order. Order 20 already has 823,065
/// free trees, and each step up roughly multiplies that by 2.5.
const DEFAULT_MAX_ORDER: usize = 20;

/// Default first k-slice size tried on each cohort.
const DEFAULT_INITIAL_K: usize = 3;

/// Order searched when none is given, only used by `Default`.
const DEFAULT_ORDER: usize = 10;

/// Settings for one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of vertices of the trees searched.
    pub order: usize,
    pub worker_threads: usize,
    pub max_worker_threads: usize,
    /// Largest order accepted; enumeration grows exponentially with it.
    pub max_order: usize,
    /// First `k` tried on every cohort.
    pub initial_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            worker_threads: DEFAULT_WORKER_THREADS,
            max_worker_threads: DEFAULT_MAX_WORKER_THREADS,
            max_order: DEFAULT_MAX_ORDER,
            initial_k: DEFAULT_INITIAL_K,
        }
    }
}

impl SearchConfig {
    /// Build the configuration from `<n> [<numThreads>]` (program name
    /// excluded) and the environment.
    ///
    /// # Environment Variables
    ///
    /// - `KSLICE_MAX_THREADS`: Maximum worker threads (default: 12)
    /// - `KSLICE_MAX_ORDER`: Maximum tree order (default: 20)
    /// - `KSLICE_INITIAL_K`: First k-slice size tried (default: 3)
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        Self::from_env()?.with_args(args)
    }

    /// Defaults overridden by the limits found in the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_worker_threads: read_number(
                "KSLICE_MAX_THREADS",
                env::var("KSLICE_MAX_THREADS").ok(),
                DEFAULT_MAX_WORKER_THREADS,
            )?,
            max_order: read_number(
                "KSLICE_MAX_ORDER",
                env::var("KSLICE_MAX_ORDER").ok(),
                DEFAULT_MAX_ORDER,
            )?,
            initial_k: read_number(
                "KSLICE_INITIAL_K",
                env::var("KSLICE_INITIAL_K").ok(),
                DEFAULT_INITIAL_K,
            )?,
            ..Self::default()
        };
        debug!(
            max_worker_threads = config.max_worker_threads,
            max_order = config.max_order,
            initial_k = config.initial_k,
            "Loaded search limits"
        );
        Ok(config)
    }

    /// Apply the positional arguments, checking them against the limits
    /// already in `self`.
    pub fn with_args<S: AsRef<str>>(self, args: &[S]) -> Result<Self, ConfigError> {
        let (order_arg, threads_arg) = match args {
            [order] => (order.as_ref(), None),
            [order, threads] => (order.as_ref(), Some(threads.as_ref())),
            _ => {
                return Err(ConfigError::usage(format!(
                    "expected 1 or 2 arguments, got {}",
                    args.len()
                )))
            }
        };

        let order = parse_positive("n", order_arg)?;
        if order > self.max_order {
            return Err(ConfigError::OrderTooLarge {
                order,
                max: self.max_order,
            });
        }

        let worker_threads = match threads_arg {
            Some(value) => parse_positive("numThreads", value)?,
            None => DEFAULT_WORKER_THREADS,
        };
        if worker_threads > self.max_worker_threads {
            return Err(ConfigError::TooManyThreads {
                requested: worker_threads,
                max: self.max_worker_threads,
            });
        }

        Ok(Self {
            order,
            worker_threads,
            ..self
        })
    }

    /// Usage text for the binary.
    pub fn usage(&self) -> String {
        format!(
            "Usage: kslice-search <n> [<numThreads>]\n\
             \x20 n           tree order, 1 to {}\n\
             \x20 numThreads  worker threads, 1 to {} (default {})",
            self.max_order, self.max_worker_threads, DEFAULT_WORKER_THREADS
        )
    }
}

fn parse_positive(name: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(ConfigError::invalid_number(name, value)),
    }
}

fn read_number(name: &str, value: Option<String>, default: usize) -> Result<usize, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_number(name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_only_defaults_to_one_thread() {
        let config = SearchConfig::default().with_args(&["9"]).unwrap();

        assert_eq!(config.order, 9);
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.initial_k, 3);
    }

    #[test]
    fn test_order_and_threads() {
        let config = SearchConfig::default().with_args(&["14", "8"]).unwrap();

        assert_eq!(config.order, 14);
        assert_eq!(config.worker_threads, 8);
    }

    #[test]
    fn test_wrong_argument_count_is_usage_error() {
        let none: [&str; 0] = [];
        assert!(matches!(
            SearchConfig::default().with_args(&none),
            Err(ConfigError::Usage(_))
        ));
        assert!(matches!(
            SearchConfig::default().with_args(&["10", "2", "extra"]),
            Err(ConfigError::Usage(_))
        ));
    }

    #[test]
    fn test_thread_limit_is_enforced() {
        assert_eq!(
            SearchConfig::default().with_args(&["10", "13"]),
            Err(ConfigError::TooManyThreads {
                requested: 13,
                max: 12
            })
        );
        assert_eq!(
            SearchConfig::default().with_args(&["10", "0"]),
            Err(ConfigError::invalid_number("numThreads", "0"))
        );
    }

    #[test]
    fn test_default_order_cap() {
        let config = SearchConfig::default();

        assert_eq!(config.max_order, 20);
        assert_eq!(config.with_args(&["20"]).map(|c| c.order), Ok(20));
    }

    #[test]
    fn test_order_is_validated() {
        assert_eq!(
            SearchConfig::default().with_args(&["21"]),
            Err(ConfigError::OrderTooLarge { order: 21, max: 20 })
        );
        assert_eq!(
            SearchConfig::default().with_args(&["ten"]),
            Err(ConfigError::invalid_number("n", "ten"))
        );
        assert_eq!(
            SearchConfig::default().with_args(&["-3"]),
            Err(ConfigError::invalid_number("n", "-3"))
        );
    }

    #[test]
    fn test_limits_carry_over() {
        let limits = SearchConfig {
            max_worker_threads: 2,
            max_order: 30,
            ..SearchConfig::default()
        };

        assert!(limits.clone().with_args(&["28", "2"]).is_ok());
        assert!(matches!(
            limits.with_args(&["28", "3"]),
            Err(ConfigError::TooManyThreads { max: 2, .. })
        ));
    }

    #[test]
    fn test_read_number() {
        assert_eq!(read_number("X", None, 7), Ok(7));
        assert_eq!(read_number("X", Some(" 16 ".to_string()), 7), Ok(16));
        assert_eq!(
            read_number("X", Some("lots".to_string()), 7),
            Err(ConfigError::invalid_number("X", "lots"))
        );
    }

    #[test]
    fn test_usage_mentions_limits() {
        let usage = SearchConfig::default().usage();

        assert!(usage.starts_with("Usage: kslice-search <n> [<numThreads>]"));
        assert!(usage.contains("1 to 20"));
        assert!(usage.contains("1 to 12"));
    }
}
