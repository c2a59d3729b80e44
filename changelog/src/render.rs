use crate::document::DocumentNode;

/// Serialize a block back to Markdown, trimmed of surrounding whitespace.
pub fn render(node: &DocumentNode) -> String {
    node.to_string().trim().to_string()
}
