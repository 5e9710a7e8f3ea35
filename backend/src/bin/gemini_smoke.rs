//! Smoke test binary for verifying Gemini API access through the orchestrator
//! This is a utility binary, not part of the main application

use gemini_chat_backend::config::Config;
use gemini_chat_backend::orchestrator::{Orchestrator, OrchestratorError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Testing Gemini API access from Rust...\n");

    let config = Config::from_env();

    // Test 1: Build the orchestrator (validates the credential)
    println!("1. Checking for GEMINI_API_KEY environment variable...");
    let orchestrator = match Orchestrator::with_gemini(&config.gemini, config.orchestrator.clone())
    {
        Ok(orchestrator) => {
            println!("   ✓ Credential found");
            orchestrator
        }
        Err(OrchestratorError::MissingCredential) => {
            eprintln!("   ✗ GEMINI_API_KEY not found in environment");
            eprintln!("   Make sure to export it: export GEMINI_API_KEY=\"your-key\"");
            return Err("Gemini API key not configured".into());
        }
        Err(e) => return Err(e.into()),
    };

    // Test 2: Show the candidate models that will be tried
    println!("\n2. Chat candidates (in order):");
    for model in &orchestrator.config().chat_models {
        println!("   - {}", model);
    }

    // Test 3: Execute a chat through the fallback chain
    println!("\n3. Executing test chat...");
    println!("   Query: 'What is 2+2? Answer in one sentence.'");
    match orchestrator
        .chat("What is 2+2? Answer in one sentence.")
        .await
    {
        Ok(text) => {
            println!("   ✓ Response received:");
            println!("   {}", text.trim());
        }
        Err(e) => {
            eprintln!("   ✗ Chat failed: {}", e);
            if let Some(kind) = e.kind() {
                eprintln!("   Classified as: {}", kind);
            }
            return Err(e.into());
        }
    }

    println!("\n✓ All checks completed!");
    Ok(())
}
