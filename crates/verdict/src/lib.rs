//! Verdict - review sentiment analysis and report generation
//!
//! A tabular review dataset goes in; a sentiment distribution, a short narrative and
//! two report documents (a paginated PDF and a flowing DOCX) come out.
//!
//! ```no_run
//! use std::path::Path;
//! use verdict::{FeedbackCollections, Palette, Pipeline, VerdictConfig};
//!
//! let pipeline = Pipeline::with_lexicon(VerdictConfig::default());
//! let output = pipeline
//!   .run(Path::new("reviews.csv"), &FeedbackCollections::default(), &Palette::default())
//!   .unwrap();
//! println!("{}", output.analysis.narrative());
//! ```

pub mod aggregate;
pub mod chart;
pub mod color;
pub mod compare;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feedback;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod template;

pub use aggregate::{AnalysisResult, Aggregator, SentimentSummary};
pub use chart::{ChartImage, ChartKind, ChartRenderer};
pub use color::{Color, Palette};
pub use compare::Comparison;
pub use config::VerdictConfig;
pub use dataset::{Dataset, ReviewRecord};
pub use error::{ErrorReport, Result, VerdictError};
pub use feedback::{FeedbackCollections, FeedbackKind, FeedbackRecord, FeedbackSet, StarRating};
pub use lexis::{LexiconModel, PolarityModel};
pub use pipeline::{DocumentFormat, GeneratedDocument, Pipeline, PipelineOutput, RenderedReport};
pub use report::{ReportBuilder, ReportDocument};
pub use sentiment::{Scorer, SentimentLabel};
