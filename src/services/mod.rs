pub mod answer_probe;
pub mod answer_sheet_reader;
pub mod classifier;
pub mod exporter;
pub mod question_fetcher;
pub mod record_encoder;
pub mod sanitizer;

pub use answer_probe::{CorrectAnswerMap, CorrectAnswerProbe, ProbeReport};
pub use answer_sheet_reader::AnswerSheetReader;
pub use classifier::classify;
pub use exporter::{Exporter, PendingFile};
pub use question_fetcher::{QuestionListFetcher, QuestionListing};
pub use record_encoder::{encode, encode_all};
pub use sanitizer::sanitize;
