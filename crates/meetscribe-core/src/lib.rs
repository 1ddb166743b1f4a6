//! MeetScribe Core Library
//!
//! Core functionality for analyzing meeting videos with a hosted
//! generative model and rendering the result as a PDF report.

pub mod config;
pub mod error;
pub mod format;
pub mod gemini;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod types;

// Re-export commonly used items at crate root
pub use config::Config;
pub use error::{MeetScribeError, Result};
pub use format::format_record_readable;
pub use gemini::{AnalysisService, FileState, GeminiClient, MEETING_ANALYSIS_PROMPT, RemoteFile};
pub use parser::{extract_json, parse_analysis};
pub use pipeline::{MeetingAnalysis, PollPolicy, analyze_media, analyze_meeting, video_mime_type};
pub use report::{encode_pdf_base64, render_pdf};
pub use types::{ActionItem, AnalysisRecord};
