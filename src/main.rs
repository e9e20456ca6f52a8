use std::{env, io, sync::Arc};

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travel_agent_api::{
    db,
    middleware::session::SessionMiddleware,
    routes,
    services::{
        agent::Agent,
        destination_service::DestinationAgent,
        embedding_service::{Embedder, OllamaEmbedder},
        expert_service::ExpertAgent,
        itinerary_service::ItineraryAgent,
        llm_service::{GroqGateway, LlmGateway, DEFAULT_MODEL},
        nlp_service::LexiconAnalyzer,
        reddit_service::RedditClient,
        session_store::SessionStore,
        vector_store::{InMemoryVectorStore, MongoVectorStore, VectorStore},
    },
};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5002;
const DEFAULT_SECRET: &str = "dev-secret-2023";
const DEFAULT_CORS_ORIGIN: &str = "https://travel-agent-ai-production.up.railway.app";
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_PDF_DIR: &str = "agents/data";

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    let secret = env::var("SECRET_KEY").unwrap_or_else(|_| {
        log::warn!("SECRET_KEY not set, using development secret");
        DEFAULT_SECRET.to_string()
    });
    let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());
    let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string());
    let pdf_dir = env::var("PDF_DIR").unwrap_or_else(|_| DEFAULT_PDF_DIR.to_string());
    let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let gateway: Arc<dyn LlmGateway> = Arc::new(GroqGateway::new().map_err(startup_error)?);
    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new());

    let mongo_client = match env::var("MONGODB_URI") {
        Ok(uri) => Some(
            db::mongo::create_mongo_client(&uri)
                .await
                .map_err(startup_error)?,
        ),
        Err(_) => {
            log::warn!("MONGODB_URI not set, using in-process vector store");
            None
        }
    };
    let store: Arc<dyn VectorStore> = match &mongo_client {
        Some(client) => Arc::new(MongoVectorStore::new(client.clone(), embedder.clone())),
        None => Arc::new(InMemoryVectorStore::new(embedder.clone())),
    };

    let destination_agent = web::Data::new(DestinationAgent::new(
        Agent::new(
            "DestinationExpert",
            "Provides factual insights on travel destinations with conversation history support",
            model.as_str(),
            gateway.clone(),
        ),
        pdf_dir,
        store,
    ));
    let itinerary_agent = web::Data::new(ItineraryAgent::new(Agent::new(
        "ItineraryPlanner",
        "Seasoned travel planner with decades of experience",
        model.as_str(),
        gateway.clone(),
    )));
    let expert_agent = web::Data::new(ExpertAgent::new(
        Agent::new(
            "OnlineAdvisor",
            "Scrapes the web for real-time advice from other travelers and summarizes it",
            model.as_str(),
            gateway,
        ),
        Arc::new(RedditClient::new().map_err(startup_error)?),
        Arc::new(LexiconAnalyzer::default()),
    ));
    let sessions = web::Data::new(SessionStore::default());
    let assets = web::Data::new(routes::assets::StaticAssets::new(static_dir));

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(destination_agent.clone())
            .app_data(itinerary_agent.clone())
            .app_data(expert_agent.clone())
            .app_data(sessions.clone())
            .app_data(assets.clone());
        if let Some(client) = &mongo_client {
            app = app.app_data(web::Data::new(client.clone()));
        }

        app.route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .wrap(SessionMiddleware::new(secret.as_str()))
                    .wrap(cors)
                    .app_data(routes::json_config())
                    .configure(routes::api),
            )
            .configure(routes::assets::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
