//! Aesthetica: photo upload, Gemini-backed aesthetic analysis, and the
//! single-page UI that walks a user through it.

pub mod analysis;
pub mod config;
pub mod controller;
pub mod gemini;
pub mod http;
pub mod i18n;
pub mod model;
pub mod schema;
pub mod session;
pub mod storage;
pub mod upload;

pub use analysis::{AnalysisError, Analyzer};
pub use config::Config;
pub use controller::{Controller, SessionView};
pub use gemini::GeminiClient;
pub use i18n::Language;
pub use model::{AnalysisResult, FeatureAnalysis, UploadedImage};
pub use storage::{HttpStorage, SideChannel, StorageSink};
