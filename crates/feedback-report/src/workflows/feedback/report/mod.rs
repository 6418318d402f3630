mod assembler;
mod insights;
mod series;
pub mod views;

pub use assembler::ReportAssembler;
pub use views::{
    DailyPoint, FeedbackReport, GeneralAnalysis, GroupDetail, GroupSummary, HourlyBucket,
    Methodology, SegmentDetail,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("no usable feedback records ({dropped_rows} rows dropped for unreadable timestamps)")]
    NoUsableData { dropped_rows: usize },
}
