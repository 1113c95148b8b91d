pub mod alerts;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod rbac;
pub mod session;

#[cfg(test)]
mod scenario_test;
