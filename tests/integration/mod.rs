//! Integration Tests Module
//!
//! End-to-end tests over the real store, matcher, lifecycle, and executor
//! with mock collaborators. No network, no LLM: generated "tools" are shell
//! scripts run through `sh`.

// Full task flow: lifecycle creation, persistence, reuse, execution
mod lifecycle_flow_test;

// Executor behavior against real subprocesses
mod execution_test;
