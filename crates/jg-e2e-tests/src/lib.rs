//! End-to-end tests for journal-gelf live under `tests/`.
