//! Conversation orchestration
//!
//! Drives one tool-augmented conversation turn: send the query and the tool
//! catalog to the model, execute any tool invocations the response requests
//! through the MCP session, feed each result back, and collect the model's
//! text output.
//!
//! The transcript lives only for the duration of one `process_query` call;
//! there is no cross-query memory.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use oc_core::{
    ClaudeClient, Message, MessageContent, MessagesRequest, MessagesResponse, Result,
    ToolDefinition,
};
use oc_mcp::{McpSession, McpTool};

/// One Messages API call with the current transcript and tool catalog
#[async_trait]
pub trait ModelApi {
    async fn send(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
    ) -> Result<MessagesResponse>;
}

#[async_trait]
impl ModelApi for ClaudeClient {
    async fn send(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
    ) -> Result<MessagesResponse> {
        let request = MessagesRequest {
            model: self.model().to_string(),
            max_tokens: self.max_tokens(),
            system: None,
            messages,
            tools: Some(tools),
        };
        self.messages(request).await
    }
}

/// The slice of the MCP session the orchestrator needs
#[async_trait]
pub trait ToolSession {
    async fn list_tools(&self) -> Result<Vec<McpTool>>;
    async fn call_tool(&self, name: &str, args: JsonValue) -> Result<String>;
}

#[async_trait]
impl ToolSession for McpSession {
    async fn list_tools(&self) -> Result<Vec<McpTool>> {
        McpSession::list_tools(self).await
    }

    async fn call_tool(&self, name: &str, args: JsonValue) -> Result<String> {
        McpSession::call_tool(self, name, args).await
    }
}

/// Process one user query with the model and the session's tools.
///
/// Content blocks of the first response are handled strictly in the order
/// the model emitted them; each tool invocation is resolved (and a follow-up
/// model call made) before the next block is examined. There is exactly one
/// outstanding model or tool request at any instant.
pub async fn process_query<M, S>(model: &M, session: &S, query: &str) -> Result<String>
where
    M: ModelApi,
    S: ToolSession,
{
    let mut messages = vec![Message::user(query)];

    let tools: Vec<ToolDefinition> = session
        .list_tools()
        .await?
        .into_iter()
        .map(|t| ToolDefinition::new(t.name, t.description, t.input_schema))
        .collect();

    let response = model.send(messages.clone(), tools.clone()).await?;

    let mut final_text = Vec::new();

    for content in &response.content {
        match content {
            MessageContent::Text { text } => {
                final_text.push(text.clone());
            }
            MessageContent::ToolUse { id, name, input } => {
                info!("Tool call: {} with args: {}", name, input);
                messages.push(Message::tool_request(id, name, input.clone()));

                match session.call_tool(name, input.clone()).await {
                    Ok(result) => {
                        info!("Tool result: {}", result);
                        final_text.push(format!("[Used {} to fetch data]", name));
                        messages.push(Message::tool_result(id, result));
                    }
                    Err(e) => {
                        // Deliberately no tool_result for a failed call; the
                        // follow-up below still happens and the model sees
                        // the unanswered request.
                        let error_msg = format!("Error calling tool {}: {}", name, e);
                        error!("{}", error_msg);
                        final_text.push(format!("[{}]", error_msg));
                    }
                }

                let follow_up = model.send(messages.clone(), tools.clone()).await?;
                for block in &follow_up.content {
                    if let MessageContent::Text { text } = block {
                        final_text.push(text.clone());
                    }
                }
            }
            // The model never emits tool_result blocks.
            MessageContent::ToolResult { .. } => {}
        }
    }

    Ok(final_text.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    fn text_block(text: &str) -> MessageContent {
        MessageContent::Text {
            text: text.to_string(),
        }
    }

    fn tool_use_block(id: &str, name: &str) -> MessageContent {
        MessageContent::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input: json!({"rsid": "rs123"}),
        }
    }

    fn response(content: Vec<MessageContent>, stop_reason: &str) -> MessagesResponse {
        MessagesResponse {
            id: "msg_test".to_string(),
            response_type: "message".to_string(),
            role: "assistant".to_string(),
            content,
            model: "claude-sonnet-4-20250514".to_string(),
            stop_sequence: None,
            stop_reason: stop_reason.to_string(),
            usage: None,
        }
    }

    /// Model fake replaying scripted responses and recording each transcript
    struct ScriptedModel {
        responses: Mutex<VecDeque<MessagesResponse>>,
        transcripts: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<MessagesResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                transcripts: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.transcripts.lock().unwrap().len()
        }

        fn transcript(&self, call: usize) -> Vec<Message> {
            self.transcripts.lock().unwrap()[call].clone()
        }
    }

    #[async_trait]
    impl ModelApi for ScriptedModel {
        async fn send(
            &self,
            messages: Vec<Message>,
            _tools: Vec<ToolDefinition>,
        ) -> Result<MessagesResponse> {
            self.transcripts.lock().unwrap().push(messages);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("model called more often than scripted"))
        }
    }

    /// Session fake with a fixed catalog and selectable failing tools
    struct FakeSession {
        tools: Vec<McpTool>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSession {
        fn new(tool_names: &[&str], failing: &[&str]) -> Self {
            Self {
                tools: tool_names
                    .iter()
                    .map(|name| McpTool {
                        name: name.to_string(),
                        description: format!("{} tool", name),
                        input_schema: json!({"type": "object"}),
                    })
                    .collect(),
                failing: failing.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolSession for FakeSession {
        async fn list_tools(&self) -> Result<Vec<McpTool>> {
            Ok(self.tools.clone())
        }

        async fn call_tool(&self, name: &str, _args: JsonValue) -> Result<String> {
            self.calls.lock().unwrap().push(name.to_string());
            if self.failing.contains(name) {
                Err(oc_core::Error::tool(name, "upstream unreachable"))
            } else {
                Ok(format!("\n{{\"tool\":\"{}\"}}\n", name))
            }
        }
    }

    #[tokio::test]
    async fn test_plain_text_answer() {
        let model = ScriptedModel::new(vec![response(
            vec![text_block("First."), text_block("Second.")],
            "end_turn",
        )]);
        let session = FakeSession::new(&["get_rsid"], &[]);

        let answer = process_query(&model, &session, "hello").await.unwrap();

        // The answer is the joined text blocks, in emitted order.
        assert_eq!(answer, "First.\nSecond.");
        assert_eq!(model.call_count(), 1);
        assert!(session.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_tool_round() {
        let model = ScriptedModel::new(vec![
            response(
                vec![
                    text_block("Looking that up."),
                    tool_use_block("toolu_01", "get_rsid"),
                ],
                "tool_use",
            ),
            response(vec![text_block("rs123 is benign.")], "end_turn"),
        ]);
        let session = FakeSession::new(&["get_rsid"], &[]);

        let answer = process_query(&model, &session, "what is rs123?")
            .await
            .unwrap();

        assert_eq!(
            answer,
            "Looking that up.\n[Used get_rsid to fetch data]\nrs123 is benign."
        );
        assert_eq!(*session.calls.lock().unwrap(), vec!["get_rsid"]);

        // The follow-up call sees user, tool request, tool result, in order,
        // with the correlation id intact.
        let transcript = model.transcript(1);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].role, "user");
        assert!(matches!(
            &transcript[1].content[0],
            MessageContent::ToolUse { id, .. } if id == "toolu_01"
        ));
        assert!(matches!(
            &transcript[2].content[0],
            MessageContent::ToolResult { tool_use_id, .. } if tool_use_id == "toolu_01"
        ));
    }

    #[tokio::test]
    async fn test_failed_tool_leaves_request_unanswered() {
        let model = ScriptedModel::new(vec![
            response(vec![tool_use_block("toolu_02", "get_rsid")], "tool_use"),
            response(vec![text_block("Could not fetch it.")], "end_turn"),
        ]);
        let session = FakeSession::new(&["get_rsid"], &["get_rsid"]);

        let answer = process_query(&model, &session, "what is rs123?")
            .await
            .unwrap();

        // The output carries an error marker naming the tool, and the
        // follow-up call was still made.
        assert!(answer.contains("Error calling tool get_rsid"));
        assert!(answer.contains("Could not fetch it."));
        assert_eq!(model.call_count(), 2);

        // No tool_result was synthesized for the failed request.
        let transcript = model.transcript(1);
        assert_eq!(transcript.len(), 2);
        assert!(matches!(
            &transcript[1].content[0],
            MessageContent::ToolUse { id, .. } if id == "toolu_02"
        ));
    }

    #[tokio::test]
    async fn test_multiple_tool_rounds_in_order() {
        let model = ScriptedModel::new(vec![
            response(
                vec![
                    tool_use_block("toolu_a", "get_rsid"),
                    tool_use_block("toolu_b", "get_caid"),
                ],
                "tool_use",
            ),
            response(vec![text_block("after first")], "end_turn"),
            response(vec![text_block("after second")], "end_turn"),
        ]);
        let session = FakeSession::new(&["get_rsid", "get_caid"], &[]);

        let answer = process_query(&model, &session, "compare them")
            .await
            .unwrap();

        assert_eq!(*session.calls.lock().unwrap(), vec!["get_rsid", "get_caid"]);
        assert_eq!(model.call_count(), 3);
        assert_eq!(
            answer,
            "[Used get_rsid to fetch data]\nafter first\n[Used get_caid to fetch data]\nafter second"
        );

        // Both requests are paired with their results in the final transcript.
        let transcript = model.transcript(2);
        assert_eq!(transcript.len(), 5);
        assert!(matches!(
            &transcript[3].content[0],
            MessageContent::ToolUse { id, .. } if id == "toolu_b"
        ));
        assert!(matches!(
            &transcript[4].content[0],
            MessageContent::ToolResult { tool_use_id, .. } if tool_use_id == "toolu_b"
        ));
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_remaining_blocks() {
        let model = ScriptedModel::new(vec![
            response(
                vec![
                    tool_use_block("toolu_a", "get_rsid"),
                    tool_use_block("toolu_b", "get_caid"),
                ],
                "tool_use",
            ),
            response(vec![], "end_turn"),
            response(vec![text_block("done")], "end_turn"),
        ]);
        let session = FakeSession::new(&["get_rsid", "get_caid"], &["get_rsid"]);

        let answer = process_query(&model, &session, "compare them")
            .await
            .unwrap();

        // The second invocation still ran after the first failed.
        assert_eq!(*session.calls.lock().unwrap(), vec!["get_rsid", "get_caid"]);
        assert!(answer.contains("Error calling tool get_rsid"));
        assert!(answer.contains("[Used get_caid to fetch data]"));
    }
}
