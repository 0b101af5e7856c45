//! Unit test suite for Noodle
//!
//! Library-level tests that exercise several modules together without going
//! through the binary.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod filesystem_walk;
