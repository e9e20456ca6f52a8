use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details.into()),
        }
    }

    fn error(details: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details.into()),
        }
    }
}

/*
    /health
*/
pub async fn health_check(client: Option<web::Data<Arc<Client>>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    health.services.insert("groq".to_string(), check_env(&["GROQ_API_KEY"]));
    health.services.insert(
        "reddit".to_string(),
        check_env(&["REDDIT_CLIENT_ID", "REDDIT_CLIENT_SECRET", "REDDIT_USER_AGENT"]),
    );

    let vector_store = match &client {
        Some(client) => check_mongodb(client).await,
        None => ServiceStatus::ok("Using in-process vector store"),
    };
    health.services.insert("vector_store".to_string(), vector_store);

    if health.services.values().any(|service| service.status != "ok") {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn check_env(keys: &[&str]) -> ServiceStatus {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| env::var(key).map(|v| v.is_empty()).unwrap_or(true))
        .collect();

    if missing.is_empty() {
        ServiceStatus::ok("Credentials configured")
    } else {
        ServiceStatus::error(format!("Missing configuration: {}", missing.join(", ")))
    }
}

async fn check_mongodb(client: &Client) -> ServiceStatus {
    match client.database("admin").run_command(doc! {"ping": 1}).await {
        Ok(_) => ServiceStatus::ok("Connected successfully to MongoDB"),
        Err(e) => {
            log::warn!("MongoDB health check failed: {}", e);
            ServiceStatus::error(format!("Failed to connect: {}", e))
        }
    }
}
