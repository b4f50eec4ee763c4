// src/grading/mod.rs

pub mod answer_key;
pub mod document;
pub mod letter;
pub mod raw_key;
pub mod score;
pub mod session;
pub mod ticker;
pub mod workspace;

pub use answer_key::{AnswerKeyStore, NormalizedKey, QuestionRange};
pub use raw_key::RawKey;
pub use score::{GradeResult, Mistake};
pub use session::{SessionState, TestSession, TickOutcome};
pub use workspace::{SharedWorkspace, Workspace};
