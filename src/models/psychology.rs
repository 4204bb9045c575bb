use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry of the psychology journal, persisted as part of the
/// `psychologyJournal` storage blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsychologyEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub emotions: String,
    pub mindset: String,
    /// 1-5 scale.
    pub confidence: u8,
    /// 1-5 scale.
    pub stress: u8,
}

impl PsychologyEntry {
    /// Clamps the 1-5 rating fields into range.
    pub fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(1, 5);
        self.stress = self.stress.clamp(1, 5);
        self
    }
}
