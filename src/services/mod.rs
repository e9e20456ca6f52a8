pub mod agent;
pub mod destination_service;
pub mod embedding_service;
pub mod expert_service;
pub mod itinerary_service;
pub mod llm_service;
pub mod nlp_service;
pub mod pdf_service;
pub mod reddit_service;
pub mod session_store;
pub mod vector_store;
