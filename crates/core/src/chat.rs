//! Generation request and response payloads.
//!
//! These are the JSON bodies exchanged with the task service. Wire
//! field names are fixed by the Prometheus backend contract (Italian
//! where the contract is Italian); Rust-side names are English with
//! `#[serde(rename)]` bridging the two.

use serde::{Deserialize, Serialize};

/// Generated text that may arrive as a single string or a list of
/// lines. The backend emits both shapes depending on the model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputText {
    Single(String),
    Lines(Vec<String>),
}

impl OutputText {
    /// True when there is no text at all (empty string or empty list).
    pub fn is_empty(&self) -> bool {
        match self {
            OutputText::Single(s) => s.is_empty(),
            OutputText::Lines(lines) => lines.iter().all(|l| l.is_empty()),
        }
    }

    /// Flatten to a single string, joining lines with `sep`.
    pub fn joined(&self, sep: &str) -> String {
        match self {
            OutputText::Single(s) => s.clone(),
            OutputText::Lines(lines) => lines.join(sep),
        }
    }
}

impl Default for OutputText {
    fn default() -> Self {
        OutputText::Single(String::new())
    }
}

impl From<&str> for OutputText {
    fn from(s: &str) -> Self {
        OutputText::Single(s.to_string())
    }
}

/// One prior conversation turn as `[role, content]`.
///
/// `content` is usually a string, but the opening assistant turn may
/// carry a list of lines, so it reuses [`OutputText`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn(pub String, pub OutputText);

/// A generation request as submitted to the enqueue endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's reflective text for this turn.
    pub user_input: String,

    /// Which seed (prompt template) this session is writing against.
    #[serde(rename = "seme_id")]
    pub seed_id: String,

    /// Prior turns of the session, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryTurn>,

    /// True on the opening turn of a session.
    #[serde(default = "default_true")]
    pub is_first_interaction: bool,

    /// The question the assistant asked on the previous turn, if any.
    #[serde(default)]
    pub last_assistant_question: Option<String>,

    /// Zero-based position of this turn within the session.
    #[serde(default)]
    pub interaction_number: u32,

    /// True when asking for the free-writing seed's echo instead of a
    /// regular reflection.
    #[serde(default)]
    pub is_eco_request: bool,

    /// Writing-session correlation id.
    pub session_id: String,

    /// Author correlation id.
    pub user_id: String,
}

fn default_true() -> bool {
    true
}

/// The sigil generated at the close of a seed's journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigilData {
    #[serde(rename = "simbolo_dominante")]
    pub dominant_symbol: String,

    #[serde(rename = "immagine")]
    pub image: String,

    #[serde(rename = "colore")]
    pub color: String,

    #[serde(rename = "forma")]
    pub shape: String,

    #[serde(rename = "codice_sigillo")]
    pub sigil_code: String,
}

/// A completed generation result.
///
/// `output`, `eco`, and `frase_finale` are always present; the sigil
/// only appears on closing turns and echo requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The main reflective text.
    pub output: OutputText,

    /// Short echo lines distilled from the user's text.
    pub eco: Vec<String>,

    /// The closing phrase: a follow-up question mid-journey, a sealing
    /// phrase at the end.
    #[serde(rename = "frase_finale")]
    pub closing_phrase: String,

    /// Present only on closing turns and echo requests.
    #[serde(rename = "sigillo", default)]
    pub sigil: Option<SigilData>,
}
