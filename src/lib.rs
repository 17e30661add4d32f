//! Cross-crate scenario tests for rangebench live under `tests/`.
