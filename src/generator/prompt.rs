//! Prompt composition for single-page app generation.

use crate::task::Attachments;

/// Attachment previews are cut to this many characters.
pub const ATTACHMENT_PREVIEW_CHARS: usize = 500;

const REQUIREMENTS: &str = "Requirements:
1. Create a SINGLE HTML file with embedded CSS and JavaScript
2. Use CDN links for any external libraries (Bootstrap, marked, highlight.js, etc.)
3. Handle all the requirements in the brief
4. Make it work immediately when opened in a browser
5. Include proper error handling
6. Use modern, clean design
7. Make sure all required IDs and elements mentioned in checks exist
8. If attachments are provided, embed them as data URIs or inline in the HTML";

const CLOSING_INSTRUCTION: &str = "Return ONLY the complete HTML code, no explanations.";

/// Build the generation prompt. Output depends only on the inputs.
pub fn compose_prompt(brief: &str, checks: &[String], attachments: &Attachments) -> String {
    let checks_context = checks
        .iter()
        .map(|check| format!("- {}", check))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a complete, production-ready single-page HTML application that satisfies this brief:

{brief}

The application must pass these checks:
{checks_context}

{attachment_context}

{REQUIREMENTS}

{CLOSING_INSTRUCTION}",
        attachment_context = attachment_context(attachments),
    )
}

fn attachment_context(attachments: &Attachments) -> String {
    if attachments.is_empty() {
        return String::new();
    }

    let mut context = String::from("\n\nAttachments provided:\n");
    for (name, content) in attachments.iter() {
        context.push_str(&format!("- {}:\n```\n{}\n```\n", name, preview(content)));
    }
    context
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(ATTACHMENT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
