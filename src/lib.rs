// Module layout (Clean Architecture style)
// - bootstrap: configuration, tracing and wiring
// - infrastructure: document store adapters and the store-backed repository
// - application: ports, query descriptions, tagging service and use cases
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
