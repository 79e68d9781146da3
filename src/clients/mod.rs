pub mod ulearning_client;

pub use ulearning_client::{SubmitAnswerBody, SubmitOutcome, SubmitVerdict, ULearningClient};
