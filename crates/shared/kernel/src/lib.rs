//! Kernel utilities shared by the server and every feature module.
//!
//! Without features this crate only carries configuration loading and ID
//! helpers. The `server` feature adds the HTTP plumbing: application state,
//! the feature module contract, the route table, the bearer guard, problem
//! details and the request pipeline.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use scaffold_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use scaffold_kernel::config::ConfigLoader;
//! use scaffold_kernel::domain::config::ApiConfig;
//!
//! let loaded = ConfigLoader::new("config")
//!     .environment("Development")
//!     .load::<ApiConfig>()
//!     .unwrap();
//! println!("listening on port {}", loaded.config.server.port);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use nanoid::nanoid;
pub use scaffold_domain as domain;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
