pub mod config;
pub mod output;
pub mod practice;
pub mod progress;
pub mod prompt;
pub mod scenario;
pub mod scoring;
pub mod session;
pub mod stderr_buffer;
