mod config;
pub mod domain;
mod pipeline;
pub mod report;
pub mod scoring;
pub mod segmentation;
pub mod sentiment;
pub mod tasks;
pub mod themes;

pub use config::{AnalysisConfig, MissingLabelPolicy, SatisfactionFormula, SegmentKey};
pub use domain::{
    AreaGroup, ClassifiedRecord, FeedbackRecord, SentimentLabel, SentimentScale, ThemeKind,
};
pub use pipeline::{AnalysisError, FeedbackPipeline};
pub use report::{FeedbackReport, ReportError};
pub use tasks::{
    analysis_router, AnalysisService, AnalysisServiceError, RepositoryError, TaskId, TaskRecord,
    TaskRepository, TaskState,
};
