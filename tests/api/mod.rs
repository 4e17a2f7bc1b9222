mod error_tests;
mod fingerprint_tests;
mod health_tests;
mod rate_limit_tests;
