//! Tool-calling agent loop over the memory store.
//!
//! The agent is deliberately stateless between runs: each [`Agent::run`]
//! builds a fresh message history, so two runs share nothing except what
//! went through the memory tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use llm_service::{ChatClient, ChatMessage, ChatTurn, LlmError, ToolCall, ToolSpec};

use crate::errors::MemoryError;
use crate::memory::MemoryStore;

/// System instructions for the memory agent.
const AGENT_INSTRUCTIONS: &str = "You manage the user's long-term memory. \
Always use your tools: call `memory_store` to save information the user \
asks you to remember, and `memory_find` to look information up before \
answering questions about the past.";

/// Maximum chat rounds per run before giving up on a final answer.
const MAX_ROUNDS: usize = 6;

/// How many memories a `memory_find` call surfaces to the model.
const FIND_LIMIT: u64 = 5;

/// The chat capability the agent loop drives. A trait so tests can script
/// the model's side of the conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatTurn, LlmError>;
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatTurn, LlmError> {
        ChatClient::chat(self, messages, tools).await
    }
}

/// A memory-enabled agent: one chat backend plus the shared store.
pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    memory: Arc<MemoryStore>,
}

impl Agent {
    pub fn new(backend: Arc<dyn ChatBackend>, memory: Arc<MemoryStore>) -> Self {
        Self { backend, memory }
    }

    fn tools() -> Vec<ToolSpec> {
        vec![
            ToolSpec::function(
                "memory_store",
                "Save a piece of information to long-term memory.",
                json!({
                    "type": "object",
                    "properties": {
                        "information": {
                            "type": "string",
                            "description": "The fact to remember, in one sentence."
                        }
                    },
                    "required": ["information"]
                }),
            ),
            ToolSpec::function(
                "memory_find",
                "Search long-term memory for information relevant to a query.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "What to look for."
                        }
                    },
                    "required": ["query"]
                }),
            ),
        ]
    }

    /// One independent invocation context: fresh history, tools wired, loop
    /// until the model answers in plain text.
    pub async fn run(&self, input: &str) -> Result<String, MemoryError> {
        info!(input, "agent run: start");
        let tools = Self::tools();
        let mut messages = vec![
            ChatMessage::system(AGENT_INSTRUCTIONS),
            ChatMessage::user(input),
        ];

        for round in 0..MAX_ROUNDS {
            let turn = self.backend.chat(&messages, &tools).await?;

            if turn.tool_calls.is_empty() {
                return turn.content.ok_or(MemoryError::NoAnswer(round + 1));
            }

            messages.push(turn.to_message());
            for call in &turn.tool_calls {
                let result = self.dispatch(call).await?;
                debug!(tool = %call.function.name, result = %result, "tool executed");
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        Err(MemoryError::NoAnswer(MAX_ROUNDS))
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<String, MemoryError> {
        let name = call.function.name.as_str();
        let args: Value =
            serde_json::from_str(&call.function.arguments).map_err(|e| MemoryError::BadToolArgs {
                tool: name.to_string(),
                reason: e.to_string(),
            })?;

        match name {
            "memory_store" => {
                let information = require_str(&args, "information", name)?;
                self.memory.store(information).await?;
                Ok("Stored.".into())
            }
            "memory_find" => {
                let query = require_str(&args, "query", name)?;
                let found = self.memory.find(query, FIND_LIMIT).await?;
                if found.is_empty() {
                    Ok("No matching memories.".into())
                } else {
                    Ok(found.join("\n"))
                }
            }
            other => Err(MemoryError::BadToolArgs {
                tool: other.to_string(),
                reason: "unknown tool".into(),
            }),
        }
    }
}

fn require_str<'a>(args: &'a Value, field: &str, tool: &str) -> Result<&'a str, MemoryError> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| MemoryError::BadToolArgs {
            tool: tool.to_string(),
            reason: format!("missing string field `{field}`"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_ingest::{
        DistanceKind, EmbeddingsProvider, IngestError, IndexHealth, PointKey, SearchHit,
        StoredPoint, VectorIndex, VectorSpec,
    };
    use llm_service::chat::ToolCallFunction;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted model: pops one prepared turn per chat call and records the
    /// messages it was shown.
    struct ScriptedBackend {
        turns: Mutex<VecDeque<ChatTurn>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedBackend {
        fn new(turns: Vec<ChatTurn>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<ChatTurn, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(self.turns.lock().unwrap().pop_front().expect("script ran dry"))
        }
    }

    fn tool_call(name: &str, arguments: &str) -> ChatTurn {
        ChatTurn {
            content: None,
            tool_calls: vec![ToolCall {
                id: format!("call_{name}"),
                kind: "function".into(),
                function: ToolCallFunction {
                    name: name.into(),
                    arguments: arguments.into(),
                },
            }],
        }
    }

    fn final_answer(text: &str) -> ChatTurn {
        ChatTurn {
            content: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    // Same persistent fake as in memory.rs tests, shared across agents.
    #[derive(Default)]
    struct SharedIndex {
        exists: Mutex<bool>,
        points: Mutex<Vec<StoredPoint>>,
    }

    #[async_trait]
    impl VectorIndex for SharedIndex {
        async fn exists(&self) -> Result<bool, IngestError> {
            Ok(*self.exists.lock().unwrap())
        }

        async fn destroy(&self) -> Result<(), IngestError> {
            *self.exists.lock().unwrap() = false;
            Ok(())
        }

        async fn create(&self, _spec: &VectorSpec) -> Result<(), IngestError> {
            *self.exists.lock().unwrap() = true;
            Ok(())
        }

        async fn upsert(&self, points: Vec<StoredPoint>) -> Result<usize, IngestError> {
            let n = points.len();
            self.points.lock().unwrap().extend(points);
            Ok(n)
        }

        async fn health(&self) -> Result<IndexHealth, IngestError> {
            Ok(IndexHealth::Ready)
        }

        async fn search(
            &self,
            _vector: Vec<f32>,
            limit: u64,
        ) -> Result<Vec<SearchHit>, IngestError> {
            Ok(self
                .points
                .lock()
                .unwrap()
                .iter()
                .take(limit as usize)
                .map(|p| SearchHit {
                    id: p.id.clone(),
                    score: 1.0,
                    document: p.payload["document"].as_str().map(str::to_owned),
                })
                .collect())
        }
    }

    struct NullEmbedder;

    #[async_trait]
    impl EmbeddingsProvider for NullEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, IngestError> {
            Ok(vec![0.0; 4])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
            Ok(vec![vec![0.0; 4]; texts.len()])
        }
    }

    fn memory_over(index: Arc<SharedIndex>) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(
            index,
            Arc::new(NullEmbedder),
            VectorSpec {
                vector_name: "fast-test".into(),
                size: 4,
                distance: DistanceKind::Cosine,
            },
        ))
    }

    #[tokio::test]
    async fn two_independent_contexts_share_memory_through_the_store() {
        let index = Arc::new(SharedIndex::default());

        // Context 1: told the secret, stores it, confirms.
        let backend1 = Arc::new(ScriptedBackend::new(vec![
            tool_call(
                "memory_store",
                r#"{"information":"the secret code is 'Aurora Penguin'"}"#,
            ),
            final_answer("Noted, I will remember the secret code."),
        ]));
        let agent1 = Agent::new(backend1, memory_over(Arc::clone(&index)));
        let confirmation = agent1
            .run("Remember that the secret code for the hackathon is 'Aurora Penguin'.")
            .await
            .unwrap();
        assert!(confirmation.contains("remember"));

        // Context 2: a different agent with a different backend and no
        // shared history recalls it through memory_find.
        let backend2 = Arc::new(ScriptedBackend::new(vec![
            tool_call("memory_find", r#"{"query":"secret code"}"#),
            final_answer("The secret code is 'Aurora Penguin'."),
        ]));
        let agent2 = Agent::new(Arc::clone(&backend2) as Arc<dyn ChatBackend>, memory_over(index));
        let recalled = agent2
            .run("What is the secret code for the event?")
            .await
            .unwrap();
        assert!(recalled.contains("Aurora Penguin"));

        // The find tool's result (fed back to the model) carried the fact
        // that only the store could have provided.
        let seen = backend2.seen.lock().unwrap();
        let last_messages = seen.last().unwrap();
        let tool_reply = last_messages
            .iter()
            .find(|m| m.role == "tool")
            .and_then(|m| m.content.as_deref())
            .unwrap();
        assert!(tool_reply.contains("Aurora Penguin"));
    }

    #[tokio::test]
    async fn each_run_starts_from_a_fresh_history() {
        let index = Arc::new(SharedIndex::default());
        let backend = Arc::new(ScriptedBackend::new(vec![
            final_answer("first"),
            final_answer("second"),
        ]));
        let agent = Agent::new(
            Arc::clone(&backend) as Arc<dyn ChatBackend>,
            memory_over(index),
        );

        agent.run("one").await.unwrap();
        agent.run("two").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        // Both runs opened with exactly [system, user], no carried history.
        assert_eq!(seen[0].len(), 2);
        assert_eq!(seen[1].len(), 2);
        assert_eq!(seen[1][1].content.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let index = Arc::new(SharedIndex::default());
        let backend = Arc::new(ScriptedBackend::new(vec![tool_call(
            "memory_wipe",
            "{}",
        )]));
        let agent = Agent::new(backend, memory_over(index));

        let err = agent.run("wipe everything").await.unwrap_err();
        assert!(matches!(err, MemoryError::BadToolArgs { tool, .. } if tool == "memory_wipe"));
    }

    #[tokio::test]
    async fn malformed_arguments_are_an_error() {
        let index = Arc::new(SharedIndex::default());
        let backend = Arc::new(ScriptedBackend::new(vec![tool_call(
            "memory_store",
            "not json",
        )]));
        let agent = Agent::new(backend, memory_over(index));

        assert!(matches!(
            agent.run("remember this").await.unwrap_err(),
            MemoryError::BadToolArgs { .. }
        ));
    }
}
