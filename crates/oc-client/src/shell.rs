//! Interactive chat shell
//!
//! A blocking read-eval-print loop: free text goes through the conversation
//! orchestrator, `tools` dumps the server catalog, `quit` exits. Ctrl+C is
//! a no-op with a hint; errors inside the loop body are logged and printed
//! without ending the loop.

use nu_ansi_term::{Color, Style};
use reedline::{Prompt, Reedline, Signal};
use tracing::error;

use oc_core::ClaudeClient;
use oc_mcp::McpSession;

use crate::orchestrator::process_query;

/// Prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.style.paint("> ").to_string())
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: reedline::PromptEditMode,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }
}

/// Run the interactive loop until `quit` or end of input
pub async fn run_shell(client: &ClaudeClient, session: &McpSession) -> anyhow::Result<()> {
    print_banner();

    let mut line_editor = Reedline::create();
    let prompt = ColoredPrompt::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let query = line.trim();

                if query.is_empty() {
                    continue;
                }

                if query.eq_ignore_ascii_case("quit") {
                    println!("Goodbye!");
                    break;
                }

                if query.eq_ignore_ascii_case("tools") {
                    if let Err(e) = print_tool_catalog(session).await {
                        error!("Failed to list tools: {}", e);
                        eprintln!("Error: {}", e);
                    }
                    continue;
                }

                println!("\nProcessing...");
                match process_query(client, session, query).await {
                    Ok(answer) => println!("\n{}", answer),
                    Err(e) => {
                        error!("Error processing query: {}", e);
                        eprintln!("\nError: {}", e);
                    }
                }
            }
            Ok(Signal::CtrlC) => {
                println!("\nUse 'quit' to exit");
            }
            Ok(Signal::CtrlD) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                error!("Input error: {}", e);
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Dump the catalog without involving the model
async fn print_tool_catalog(session: &McpSession) -> oc_core::Result<()> {
    let tools = session.list_tools().await?;
    println!("{}", format_tool_catalog(&tools));
    Ok(())
}

/// Render the catalog dump for the `tools` command
fn format_tool_catalog(tools: &[oc_mcp::McpTool]) -> String {
    let mut out = String::from("\nAvailable tools:");
    for tool in tools {
        out.push_str(&format!("\n  - {}", tool.name));
        out.push_str(&format!("\n    {}", tool.description));
        if !tool.input_schema.is_null() {
            out.push_str(&format!("\n    Parameters: {}", tool.input_schema));
        }
    }
    out
}

fn print_banner() {
    println!();
    println!("{}", "=".repeat(50));
    println!("oc-client - Variant Annotation Chat");
    println!("{}", "=".repeat(50));
    println!("Type your queries or 'quit' to exit");
    println!("Type 'tools' to list available tools");
    println!("{}", "-".repeat(50));
}
