#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use travel_agent_api::{
    middleware::session::SessionMiddleware,
    routes,
    services::{
        agent::Agent,
        destination_service::DestinationAgent,
        embedding_service::{Embedder, EmbeddingError},
        expert_service::ExpertAgent,
        itinerary_service::ItineraryAgent,
        llm_service::{CompletionRequest, LlmError, LlmGateway},
        nlp_service::LexiconAnalyzer,
        reddit_service::{PostSource, RedditError},
        session_store::SessionStore,
        vector_store::InMemoryVectorStore,
    },
};

pub const TEST_SECRET: &str = "test-secret";
pub const LLM_ANSWER: &str = "## Answer\n- A markdown reply";

/// Records every prompt and answers with a fixed markdown string.
#[derive(Default)]
pub struct FakeGateway {
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for FakeGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let prompt = request
            .messages
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        Ok(LLM_ANSWER.to_string())
    }
}

/// Bag-of-letters embedding; close enough for ranking in tests.
pub struct FakeEmbedder;

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0; 26];
        for c in text.to_lowercase().chars().filter(char::is_ascii_lowercase) {
            vector[(c as u8 - b'a') as usize] += 1.0;
        }
        Ok(vector)
    }
}

pub struct FakePosts(pub Vec<String>);

#[async_trait]
impl PostSource for FakePosts {
    async fn search(&self, _keyword: &str, limit: usize) -> Result<Vec<String>, RedditError> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

pub struct TestApp {
    pub gateway: Arc<FakeGateway>,
    pub sessions: web::Data<SessionStore>,
    pub static_dir: TempDir,
    pub pdf_dir: TempDir,
    destination_agent: web::Data<DestinationAgent>,
    itinerary_agent: web::Data<ItineraryAgent>,
    expert_agent: web::Data<ExpertAgent>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_posts(vec![
            "Loved Lisbon. Tip: ride tram 28 early.".to_string(),
            "Great food in Porto. Best advice is to book ahead.".to_string(),
        ])
    }

    pub fn with_posts(posts: Vec<String>) -> Self {
        let gateway = Arc::new(FakeGateway::default());
        let static_dir = TempDir::new().unwrap();
        let pdf_dir = TempDir::new().unwrap();

        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>travel agent</body></html>",
        )
        .unwrap();
        std::fs::create_dir(static_dir.path().join("assets")).unwrap();
        std::fs::write(static_dir.path().join("assets/app.js"), "console.log('ok');").unwrap();

        let store = Arc::new(InMemoryVectorStore::new(Arc::new(FakeEmbedder)));

        let destination_agent = web::Data::new(DestinationAgent::new(
            Agent::new("DestinationExpert", "test", "test-model", gateway.clone()),
            pdf_dir.path(),
            store,
        ));
        let itinerary_agent = web::Data::new(ItineraryAgent::new(Agent::new(
            "ItineraryPlanner",
            "test",
            "test-model",
            gateway.clone(),
        )));
        let expert_agent = web::Data::new(ExpertAgent::new(
            Agent::new("OnlineAdvisor", "test", "test-model", gateway.clone()),
            Arc::new(FakePosts(posts)),
            Arc::new(LexiconAnalyzer::default()),
        ));

        Self {
            gateway,
            sessions: web::Data::new(SessionStore::default()),
            static_dir,
            pdf_dir,
            destination_agent,
            itinerary_agent,
            expert_agent,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.destination_agent.clone())
            .app_data(self.itinerary_agent.clone())
            .app_data(self.expert_agent.clone())
            .app_data(self.sessions.clone())
            .app_data(web::Data::new(routes::assets::StaticAssets::new(
                self.static_dir.path(),
            )))
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .wrap(SessionMiddleware::new(TEST_SECRET))
                    .app_data(routes::json_config())
                    .configure(routes::api),
            )
            .configure(routes::assets::configure)
    }
}
