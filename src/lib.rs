//! Railway track crack analysis client
//!
//! 画像を推論サービスに送り、判定結果を確信度メーター付きで表示する。

pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod preview;
pub mod render;
pub mod scanner;
pub mod session;
pub mod upload;
pub mod workflow;
