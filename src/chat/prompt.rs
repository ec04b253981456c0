//! System prompt assembly

use crate::broker::Catalog;

use super::schema::SchemaDigest;

/// Build the system prompt for one turn
///
/// The prompt carries the persona, every catalog tool grouped by provider with
/// its input schema, and the schema digest when one is available.
pub fn build_system_prompt(persona: &str, catalog: &Catalog, digest: Option<&SchemaDigest>) -> String {
    let mut prompt = String::new();

    prompt.push_str(persona.trim());
    prompt.push_str("\n\n");

    prompt.push_str("## Available Tools\n");
    for (provider, names) in catalog.tools_by_provider() {
        prompt.push_str(&format!("\n### {}\n", provider));
        for name in names {
            let Some(tool) = catalog.get(&name) else {
                continue;
            };
            prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
            prompt.push_str(&format!("  Input schema: {}\n", tool.input_schema));
        }
    }

    if let Some(digest) = digest
        && !digest.is_empty()
    {
        prompt.push('\n');
        prompt.push_str(&digest.render());
    }

    prompt.push_str(
        "\nWhen a request matches one of these tools you MUST call the tool. \
         Do not just explain what you would do.\n",
    );

    prompt
}
