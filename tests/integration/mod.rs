//! Integration tests with mock HTTP server

mod batch;
mod cancellation;
mod interceptors;
mod pool;
mod requests;
