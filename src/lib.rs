//! # API Edge Library
//!
//! Request-edge services for a chat platform HTTP API:
//! - Time-ordered 64-bit snowflake identifiers
//! - Fixed-window rate limiting per client identity and route group
//! - A uniform error taxonomy with encoded JSON bodies
//! - `X-RateLimit-*` response headers
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Snowflake, fingerprint and rate limit value objects
//! - **Application Layer**: Fingerprint issuing service and DTOs
//! - **Infrastructure Layer**: In-memory bucket store and metrics
//! - **Presentation Layer**: HTTP routes, extractors and middleware
//!
//! ## Module Structure
//!
//! ```text
//! api_edge/
//! +-- config/         Configuration management
//! +-- domain/         Value objects
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Rate limit store and metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, codec, clock, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core value objects
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers and middleware
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
