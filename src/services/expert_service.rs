use crate::models::expert::PostInsight;
use crate::services::agent::Agent;
use crate::services::llm_service::LlmError;
use crate::services::nlp_service::TextAnalyzer;
use crate::services::reddit_service::{PostSource, RedditError};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

const POST_LIMIT: usize = 5;
const ADVICE_KEYWORDS: [&str; 2] = ["tip", "advice"];

#[derive(Debug)]
pub enum ExpertError {
    RedditError(RedditError),
    LlmError(LlmError),
}

impl fmt::Display for ExpertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpertError::RedditError(err) => write!(f, "Reddit error: {}", err),
            ExpertError::LlmError(err) => write!(f, "LLM error: {}", err),
        }
    }
}

impl Error for ExpertError {}

impl From<RedditError> for ExpertError {
    fn from(err: RedditError) -> Self {
        ExpertError::RedditError(err)
    }
}

impl From<LlmError> for ExpertError {
    fn from(err: LlmError) -> Self {
        ExpertError::LlmError(err)
    }
}

/// Sentences (split on '.') that mention a tip or advice.
pub fn extract_tips(text: &str) -> Vec<String> {
    text.split('.')
        .filter(|line| {
            let lower = line.to_lowercase();
            ADVICE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

pub struct ExpertAgent {
    agent: Agent,
    source: Arc<dyn PostSource>,
    analyzer: Arc<dyn TextAnalyzer>,
}

impl ExpertAgent {
    pub fn new(agent: Agent, source: Arc<dyn PostSource>, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            agent: agent.with_avatar("travel_avatar.png"),
            source,
            analyzer,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn extract_entities(&self, text: &str) -> Vec<String> {
        self.analyzer.places(text)
    }

    pub fn analyze_sentiment(&self, text: &str) -> f64 {
        self.analyzer.polarity(text)
    }

    pub async fn scrape_reddit(&self, location: &str) -> Result<Vec<String>, ExpertError> {
        Ok(self.source.search(location, POST_LIMIT).await?)
    }

    pub fn analyze_post(&self, text: &str) -> PostInsight {
        PostInsight {
            text: text.to_string(),
            places: self.extract_entities(text),
            sentiment: self.analyze_sentiment(text),
            tips: extract_tips(text),
        }
    }

    pub fn build_prompt(&self, location: &str, insights: &[PostInsight]) -> String {
        let mut prompt = format!(
            "Here is a collection of travel insights about {} from reddit:\n",
            location
        );

        for insight in insights {
            prompt.push_str(&format!(
                "Text: {}\nPlaces: {:?}\nSentiment: {}\nTips: {:?}\n",
                insight.text, insight.places, insight.sentiment, insight.tips
            ));
        }

        prompt.push_str(&format!(
            "
        **Your Task**
        Distill, from the full comments, the most informative sentence with advice or tips on traveling to {}.
        Format these as short comments in double quotation marks and single lines.
        Then use a uniform scale of emojis to rate the sentiment of the place.
        Finally give some summarizing tips.
        ",
            location
        ));
        prompt
    }

    pub async fn get_travel_insights(&self, query: &str, location: &str) -> Result<String, ExpertError> {
        log::info!("Gathering traveler insights for '{}' (query: '{}')", location, query);

        let texts = self.scrape_reddit(location).await?;
        let insights: Vec<PostInsight> = texts.iter().map(|text| self.analyze_post(text)).collect();
        log::debug!("Analyzed {} posts for '{}'", insights.len(), location);

        let prompt = self.build_prompt(location, &insights);
        Ok(self.agent.get_response(&prompt).await?)
    }
}
