//! DeepSeek walkthrough: a bare prompt, a system + user conversation and a
//! small batch, all against the OpenAI-compatible DeepSeek endpoint.
//!
//! Reads `DEEPSEEK_API_KEY` (and optionally `DEEPSEEK_BASE_URL`,
//! `DEEPSEEK_MODEL`, `DEEPSEEK_DEBUG`, ...) from the environment.

use chatbridge::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = BackendConfig::from_env("DEEPSEEK", "deepseek-chat")?;
    let provider = chatbridge::provider::deepseek(&config)?;

    let invoker = Invoker::builder(provider, config)
        .layer(TimeoutLayer::new())
        .layer(LoggingLayer::new())
        .finish();

    println!("=== Example 1: Simple prompt ===\n");
    let reply = invoker.call("Introduce yourself in one sentence.", None).await;
    println!("DeepSeek: {}\n", reply);

    println!("=== Example 2: System and user messages ===\n");
    invoker.set_debug(true);
    let conversation = Conversation::from(vec![
        Message::system("You are a professional financial assistant."),
        Message::user("What is an ETF?"),
    ]);
    match invoker.invoke(conversation, None).await {
        InvocationResult::Success(text) => println!("Answer: {}\n", text),
        InvocationResult::Failure(text) => println!("Failed: {}\n", text),
    }
    invoker.set_debug(false);

    println!("=== Example 3: Batch generation ===\n");
    let stop = vec!["\n\n".to_string()];
    let batch = invoker
        .generate(
            vec![
                Conversation::from("Name one stock exchange."),
                Conversation::from(vec![
                    Message::system("Answer with a single word."),
                    Message::user("What color is the sky?"),
                ]),
            ],
            Some(stop.as_slice()),
        )
        .await;
    for (i, text) in batch.texts().iter().enumerate() {
        println!("[{}] {}", i, text);
    }

    println!("\nidentifying params: {:?}", invoker.identifying_params());

    Ok(())
}
