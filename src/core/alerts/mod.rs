// Derived inventory alerts.
//
// Architecture:
// - model.rs: Alert, severity and dismissal-fingerprint types
// - engine.rs: Pure derivation from snapshots plus dismissal tracking

pub mod engine;
pub mod model;
