//! teachmachine - teach a classifier together and watch its fairness
//!
//! Participants submit labeled examples over a WebSocket. After every
//! submission the shared model is retrained on the whole dataset and the
//! new accuracy and fairness gap are broadcast to everyone.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod session;
pub mod training;
