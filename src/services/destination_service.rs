use crate::models::conversation::{last_turns, HistoryEntry};
use crate::models::destination::ChunkRecord;
use crate::services::agent::{Agent, ResponseOptions};
use crate::services::llm_service::LlmError;
use crate::services::pdf_service::{self, PdfError, TextSplitter};
use crate::services::vector_store::{VectorStore, VectorStoreError};
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

const DESTINATION_PATTERNS: &[&str] = &[
    r"(?i)tell me about (.+)",
    r"(?i)about (.+)",
    r"(?i)information on (.+)",
    r"(?i)guide me about (.+)",
    r"(?i)details on (.+)",
];

const FOLLOWUP_CUES: &[&str] = &["they", "it", "there", "that", "those", "more", "how about"];

const REWRITE_MAX_TOKENS: u32 = 100;
const REWRITE_HISTORY_TURNS: usize = 3;
const PROMPT_HISTORY_TURNS: usize = 2;
const RESULTS: usize = 3;
const FOLLOWUP_RESULTS: usize = 5;

#[derive(Debug)]
pub enum DestinationError {
    LlmError(LlmError),
    VectorStoreError(VectorStoreError),
    PdfError(PdfError),
}

impl fmt::Display for DestinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationError::LlmError(err) => write!(f, "LLM error: {}", err),
            DestinationError::VectorStoreError(err) => write!(f, "Vector store error: {}", err),
            DestinationError::PdfError(err) => write!(f, "PDF error: {}", err),
        }
    }
}

impl Error for DestinationError {}

impl From<LlmError> for DestinationError {
    fn from(err: LlmError) -> Self {
        DestinationError::LlmError(err)
    }
}

impl From<VectorStoreError> for DestinationError {
    fn from(err: VectorStoreError) -> Self {
        DestinationError::VectorStoreError(err)
    }
}

impl From<PdfError> for DestinationError {
    fn from(err: PdfError) -> Self {
        DestinationError::PdfError(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestType {
    Culture,
    Food,
    Nature,
}

impl InterestType {
    /// Keyword sniffing on the lowercased message, checked in the order
    /// culture, food, nature.
    pub fn detect(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if mentions(&["culture", "history", "art"]) {
            Some(InterestType::Culture)
        } else if mentions(&["food", "eat"]) {
            Some(InterestType::Food)
        } else if mentions(&["nature", "hiking", "green"]) {
            Some(InterestType::Nature)
        } else {
            None
        }
    }

    fn greeting_prompt(&self) -> &'static str {
        match self {
            InterestType::Culture => "Generate a suggestion of european countries for travelers interested in exploring culture/history/arts.",
            InterestType::Food => "Generate a suggestion of european countries for travelers interested in exploring food/culinary/eating.",
            InterestType::Nature => "Generate a suggestion of european countries for travelers interested in exploring nature/hiking.",
        }
    }
}

fn destination_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DESTINATION_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Pulls a destination name out of free text. The first matching pattern
/// wins; without a match the whole trimmed message is the destination.
pub fn extract_destination(message: &str) -> String {
    for regex in destination_patterns() {
        if let Some(captures) = regex.captures(message) {
            if let Some(group) = captures.get(1) {
                return group.as_str().trim().to_string();
            }
        }
    }
    message.trim().to_string()
}

pub fn is_followup(query: &str, history: &[HistoryEntry]) -> bool {
    if history.is_empty() {
        return false;
    }
    let lower = query.to_lowercase();
    FOLLOWUP_CUES.iter().any(|cue| lower.contains(cue))
}

fn format_history(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .map(|turn| format!("User: {}\nBot: {}", turn.user, turn.bot))
        .collect::<Vec<_>>()
        .join("\n")
}

fn summarize_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return "New conversation".to_string();
    }
    last_turns(history, PROMPT_HISTORY_TURNS)
        .iter()
        .map(|turn| turn.user.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DestinationAgent {
    agent: Agent,
    pdf_dir: PathBuf,
    store: Arc<dyn VectorStore>,
    splitter: TextSplitter,
    loaded_destinations: Mutex<HashSet<String>>,
}

impl DestinationAgent {
    pub fn new(agent: Agent, pdf_dir: impl Into<PathBuf>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            agent: agent.with_avatar("travel_avatar.png"),
            pdf_dir: pdf_dir.into(),
            store,
            splitter: TextSplitter::default(),
            loaded_destinations: Mutex::new(HashSet::new()),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn extract_destination(&self, message: &str) -> String {
        extract_destination(message)
    }

    pub fn is_followup(&self, query: &str, history: &[HistoryEntry]) -> bool {
        is_followup(query, history)
    }

    pub fn is_loaded(&self, destination: &str) -> bool {
        let loaded = match self.loaded_destinations.lock() {
            Ok(loaded) => loaded,
            Err(poisoned) => poisoned.into_inner(),
        };
        loaded.contains(&destination.to_lowercase())
    }

    fn mark_loaded(&self, destination: &str) {
        let mut loaded = match self.loaded_destinations.lock() {
            Ok(loaded) => loaded,
            Err(poisoned) => poisoned.into_inner(),
        };
        loaded.insert(destination.to_lowercase());
    }

    pub fn get_matching_pdf(&self, destination: &str) -> Result<Option<PathBuf>, DestinationError> {
        Ok(pdf_service::find_matching_pdf(&self.pdf_dir, destination)?)
    }

    /// Ingests the destination's PDF into the vector store once per process.
    /// Returns `false` when no PDF exists for the destination.
    pub async fn ensure_destination_loaded(&self, destination: &str) -> Result<bool, DestinationError> {
        if self.is_loaded(destination) {
            return Ok(true);
        }

        let Some(pdf_file) = self.get_matching_pdf(destination)? else {
            log::info!("No PDF found for destination '{}'", destination);
            return Ok(false);
        };

        let text = pdf_service::extract_text(pdf_file.clone()).await?;
        let chunks = self.splitter.split(&text);
        log::info!(
            "Loading {} chunks for '{}' from {}",
            chunks.len(),
            destination,
            pdf_file.display()
        );

        for (i, chunk) in chunks.into_iter().enumerate() {
            self.store
                .add(ChunkRecord::new(i, destination, chunk))
                .await?;
        }

        self.mark_loaded(destination);
        Ok(true)
    }

    /// Rewrites a follow-up into a question that stands on its own.
    pub async fn make_standalone_query(
        &self,
        current_query: &str,
        history: &[HistoryEntry],
    ) -> Result<String, DestinationError> {
        if !is_followup(current_query, history) {
            return Ok(current_query.to_string());
        }

        let history_str = format_history(last_turns(history, REWRITE_HISTORY_TURNS));
        let prompt = format!(
            "
        Rewrite this follow-up question to be standalone using context:
        Chat History:
        {}
        Follow-up: {}
        Standalone question:",
            history_str, current_query
        );

        let rewritten = self
            .agent
            .get_response_with(
                &prompt,
                ResponseOptions {
                    max_tokens: Some(REWRITE_MAX_TOKENS),
                    ..Default::default()
                },
            )
            .await?;

        Ok(rewritten.trim().to_string())
    }

    pub async fn get_relevant_documents(
        &self,
        query: &str,
        history: &[HistoryEntry],
        destination: Option<&str>,
    ) -> Result<Vec<String>, DestinationError> {
        let n_results = if is_followup(query, history) {
            FOLLOWUP_RESULTS
        } else {
            RESULTS
        };
        let destination = destination.map(str::to_lowercase);

        Ok(self
            .store
            .query(query, n_results, destination.as_deref())
            .await?)
    }

    fn build_contextual_prompt(&self, context: &str, history: &[HistoryEntry], query: &str) -> String {
        let context = if context.is_empty() {
            "No specific location context available"
        } else {
            context
        };

        format!(
            "
        **Conversation Context**
        Previous discussion: {}
        Current focus: {}

        **Document Context**
        {}

        **Response Requirements**
        - Address follow-up aspects from conversation history
        - Highlight new information not previously mentioned
        - Maintain natural flow with previous exchanges
        - Include emojis relevant to key points
        - Italicize all info retrieved from local pdf file and nothing else
        ",
            summarize_history(history),
            query,
            context
        )
    }

    /// Answers from the destination's PDF, or returns an empty string when
    /// the destination has no PDF.
    pub async fn query_pdf(
        &self,
        destination: &str,
        history: &[HistoryEntry],
        query: Option<&str>,
    ) -> Result<String, DestinationError> {
        if !self.ensure_destination_loaded(destination).await? {
            return Ok(String::new());
        }

        let effective_query = self
            .make_standalone_query(query.unwrap_or(destination), history)
            .await?;
        let docs = self
            .get_relevant_documents(&effective_query, history, Some(destination))
            .await?;
        let pdf_context = docs.join("\n");

        let prompt = self.build_contextual_prompt(&pdf_context, history, &effective_query);
        Ok(self.agent.get_response(&prompt).await?)
    }

    pub async fn get_destination_insights(
        &self,
        destination: &str,
        history: &[HistoryEntry],
        query: Option<&str>,
        use_pdf: bool,
    ) -> Result<String, DestinationError> {
        let pdf_context = if use_pdf {
            self.query_pdf(destination, history, query).await?
        } else {
            String::new()
        };

        let local_context = if pdf_context.is_empty() {
            "No local info available".to_string()
        } else {
            pdf_context
        };
        let recent = if history.is_empty() {
            "No recent history".to_string()
        } else {
            serde_json::to_string(last_turns(history, PROMPT_HISTORY_TURNS))
                .unwrap_or_else(|_| format_history(last_turns(history, PROMPT_HISTORY_TURNS)))
        };

        let prompt = format!(
            "
        **Local Guide Context:**
        {}

        **Conversation History:**
        {}

        **Your Task:**
        Provide insights about {} including:
        - Cultural/historical context
        - Interesting historical fact/story
        - Best cities/attractions to visit
        - Ideal traveler profiles
        - Best time to visit

        Format with:
        - Markdown headers for sections
        - Bullet points for lists
        - Emojis for key points
        - Italics for local context details
        ",
            local_context, recent, destination
        );

        Ok(self.agent.get_response(&prompt).await?)
    }

    pub async fn greet(&self, interest: InterestType) -> Result<String, DestinationError> {
        Ok(self.agent.get_response(interest.greeting_prompt()).await?)
    }
}
