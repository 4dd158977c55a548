//! Quarry HTTP server library (router, handlers and state shared with integration tests).

pub mod gateway;
