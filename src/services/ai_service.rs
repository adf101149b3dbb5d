// storefront-api/src/services/ai_service.rs

//! Product-assistant passthrough to the Gemini generateContent API.
//!
//! The feature is disabled (fails Upstream) when no API key is configured;
//! transport or decode failures propagate the same way. No retries.

use crate::errors::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

const NOT_CONFIGURED: &str =
  "AI service is not configured. Please set GEMINI_API_KEY in environment variables.";

#[derive(Debug, Deserialize)]
pub struct AskPayload {
  pub question: String,
  pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
  candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
  parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
  text: Option<String>,
}

fn product_context(product: &Product) -> String {
  format!(
    "Product Information:\n\
     - Name: {}\n\
     - Description: {}\n\
     - Price: ${:.2}\n\
     - Category: {}\n\
     - Stock: {} units available\n",
    product.name,
    product.description.as_deref().unwrap_or("(no description)"),
    product.price_cents as f64 / 100.0,
    product.category,
    product.stock,
  )
}

fn build_prompt(question: &str, context: Option<&str>) -> String {
  format!(
    "You are a helpful product assistant for an e-commerce store.\n\
     {}\n\
     \n\
     User Question: {}\n\
     \n\
     Please provide a clear, helpful, and concise answer. If the question is about a specific product, \
     use the product information provided. Keep your response friendly and informative, suitable for \
     customers who may not be tech-savvy.",
    context.unwrap_or("You can answer questions about products in general."),
    question,
  )
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
  response
    .candidates?
    .into_iter()
    .next()?
    .content
    .parts
    .into_iter()
    .find_map(|part| part.text)
}

/// Answers a customer question, optionally grounded in one product's details.
#[instrument(name = "ai_service::ask", skip(state, payload), fields(product_id = ?payload.product_id))]
pub async fn ask(state: &AppState, payload: &AskPayload) -> Result<String> {
  if payload.question.trim().is_empty() {
    return Err(AppError::Validation("Question is required".to_string()));
  }

  let api_key = state
    .config
    .gemini_api_key
    .as_deref()
    .ok_or_else(|| AppError::Upstream(NOT_CONFIGURED.to_string()))?;

  // A missing product is not an error here; the question just goes out
  // without product context.
  let mut context = None;
  if let Some(product_id) = payload.product_id {
    match crate::services::product_service::get_product(&state.db_pool, product_id).await {
      Ok(product) => context = Some(product_context(&product)),
      Err(AppError::NotFound(_)) => {
        warn!("Product for AI context not found; answering without it.");
      }
      Err(other) => return Err(other),
    }
  }

  let prompt = build_prompt(payload.question.trim(), context.as_deref());
  let body = json!({
    "contents": [{ "parts": [{ "text": prompt }] }]
  });

  let response = state
    .http_client
    .post(GEMINI_ENDPOINT)
    .query(&[("key", api_key)])
    .json(&body)
    .send()
    .await
    .map_err(|e| AppError::Upstream(format!("AI service error: {}", e)))?;

  if !response.status().is_success() {
    let status = response.status();
    warn!(%status, "Gemini returned a non-success status.");
    return Err(AppError::Upstream(format!("AI service error: upstream status {}", status)));
  }

  let parsed: GenerateContentResponse = response
    .json()
    .await
    .map_err(|e| AppError::Upstream(format!("AI service error: {}", e)))?;

  let answer = extract_text(parsed)
    .ok_or_else(|| AppError::Upstream("AI service error: empty response".to_string()))?;

  info!("AI assistant answered a question.");
  Ok(answer)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn product() -> Product {
    Product {
      id: Uuid::new_v4(),
      name: "Laptop".to_string(),
      description: Some("Thin and light".to_string()),
      price_cents: 129_999,
      category: "Electronics".to_string(),
      stock: 7,
      image: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn prompt_includes_product_context_when_present() {
    let ctx = product_context(&product());
    let prompt = build_prompt("Is it good for travel?", Some(&ctx));
    assert!(prompt.contains("Name: Laptop"));
    assert!(prompt.contains("Price: $1299.99"));
    assert!(prompt.contains("7 units available"));
    assert!(prompt.contains("User Question: Is it good for travel?"));
  }

  #[test]
  fn prompt_falls_back_to_general_context() {
    let prompt = build_prompt("What do you sell?", None);
    assert!(prompt.contains("questions about products in general"));
  }

  #[test]
  fn extracts_first_candidate_text() {
    let parsed: GenerateContentResponse = serde_json::from_value(json!({
      "candidates": [
        { "content": { "parts": [ { "text": "Yes, it travels well." } ] } }
      ]
    }))
    .unwrap();
    assert_eq!(extract_text(parsed).as_deref(), Some("Yes, it travels well."));
  }

  #[test]
  fn empty_candidates_yield_none() {
    let parsed: GenerateContentResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
    assert!(extract_text(parsed).is_none());

    let parsed: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
    assert!(extract_text(parsed).is_none());
  }
}
