//! Prompt construction for schema-bound extraction
//!
//! One template serves both the plain and the field-citation flavor,
//! parameterized by a flag; the two instruction sets share every sentence
//! they can so the flavors cannot drift apart. The schema document is
//! embedded verbatim (pretty printed) so the model sees exact field names,
//! types, and descriptions.

use gangway_domain::{ContextChunk, SchemaDefinition};

/// Visible separator between chunk texts in plain mode
const CHUNK_DELIMITER: &str = "\n\n---\n\n";

const PREAMBLE: &str = "You are an expert data extraction system. Your task is to analyze the \
provided text context, which comes from a single document identified by its ID, and extract \
information precisely according to the requested JSON schema.";

/// Builds the extraction prompt for one chunk set and schema
pub struct PromptBuilder<'a> {
    chunks: &'a [ContextChunk],
    schema: &'a SchemaDefinition,
    citations: bool,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for the plain extraction prompt
    pub fn new(chunks: &'a [ContextChunk], schema: &'a SchemaDefinition) -> Self {
        Self {
            chunks,
            schema,
            citations: false,
        }
    }

    /// Switch to the field-citation flavor: chunks are numbered and the
    /// model is asked for a second `field_citations` key
    pub fn with_citations(mut self) -> Self {
        self.citations = true;
        self
    }

    /// Build the complete prompt
    ///
    /// Returns `None` when no chunk carries usable text - a prompt with an
    /// empty context section is never emitted.
    pub fn build(&self) -> Option<String> {
        let context = self.render_context()?;

        let mut prompt = String::new();
        prompt.push_str(PREAMBLE);
        prompt.push_str("\n\n<document_context>\n");
        prompt.push_str(&context);
        prompt.push_str("\n</document_context>\n\n");

        prompt.push_str("Strictly adhere to the following instructions for your response:\n");
        for (number, instruction) in self.instructions().iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", number + 1, instruction));
        }

        prompt.push_str("\n<json_schema>\n");
        prompt.push_str(&self.schema.to_pretty_json());
        prompt.push_str("\n</json_schema>\n\n");

        prompt.push_str(
            "Based *only* on the provided <document_context> and adhering strictly to all \
             instructions above, generate the JSON object.",
        );

        Some(prompt)
    }

    /// Concatenate chunk texts, skipping chunks with no usable text
    ///
    /// In citation mode each chunk is labelled with its position in the
    /// retrieval result (`[CHUNK_1]`, `[CHUNK_2]`, ...). Labels always
    /// reflect the original position - skipped empty chunks leave a gap -
    /// so that citation tokens resolve against the retrieved array.
    fn render_context(&self) -> Option<String> {
        let rendered: Vec<String> = self
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.has_text())
            .map(|(position, chunk)| {
                if self.citations {
                    format!("[CHUNK_{}]\n{}", position + 1, chunk.text.trim())
                } else {
                    chunk.text.trim().to_string()
                }
            })
            .collect();

        if rendered.is_empty() {
            return None;
        }

        let separator = if self.citations { "\n\n" } else { CHUNK_DELIMITER };
        Some(rendered.join(separator))
    }

    fn instructions(&self) -> Vec<String> {
        let mut instructions = vec![
            "Extract information *only* from the text provided in <document_context>. Do not \
             infer, guess, or add information not explicitly present in the text."
                .to_string(),
            if self.citations {
                "Your *entire* response must be a single, valid JSON object with exactly two \
                 top-level keys: \"extracted_data\" and \"field_citations\"."
                    .to_string()
            } else {
                "Your *entire* response must be a single, valid JSON object.".to_string()
            },
            if self.citations {
                "The value of \"extracted_data\" must conform *exactly* to the structure and \
                 data types defined in <json_schema> below, with every schema property present."
                    .to_string()
            } else {
                "The JSON object must conform *exactly* to the structure and data types defined \
                 in <json_schema> below, with every schema property present."
                    .to_string()
            },
            "If a specific piece of information required by the schema is not found in the \
             context, use the JSON value null for that field's value. Do *not* omit the field \
             itself."
                .to_string(),
            "Pay close attention to the data types specified in the schema (string, number, \
             integer, boolean, array, object). For fields specified as number or integer, \
             provide only the numeric value without currency symbols, commas, or units, if \
             possible based on the text. For dates, use YYYY-MM-DD format if the text allows, \
             otherwise use the format present in the text."
                .to_string(),
        ];

        if self.citations {
            instructions.push(
                "The value of \"field_citations\" must map each field name to the list of chunk \
                 labels (for example [\"CHUNK_1\", \"CHUNK_3\"]) whose text contains the \
                 evidence for that field's value. Only reference chunks that actually contain \
                 relevant information; use an empty list for fields not found."
                    .to_string(),
            );
        }

        instructions.push(
            "Do not include *any* text, explanations, apologies, or introductory phrases before \
             or after the JSON object. Your response must start *immediately* with { and end \
             *exactly* with }. Do not wrap the JSON in markdown code fences."
                .to_string(),
        );

        instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> SchemaDefinition {
        SchemaDefinition::new(
            "test_schema",
            json!({
                "type": "object",
                "properties": {
                    "maturity_date": {
                        "description": "The maturity date of the loan.",
                        "type": ["string", "null"]
                    }
                },
                "required": ["maturity_date"]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_prompt_includes_chunk_text_and_delimiter() {
        let chunks = vec![
            ContextChunk::new("First chunk.", 0.9),
            ContextChunk::new("Second chunk.", 0.8),
        ];

        let prompt = PromptBuilder::new(&chunks, &schema()).build().unwrap();
        assert!(prompt.contains("First chunk."));
        assert!(prompt.contains("Second chunk."));
        assert!(prompt.contains("\n\n---\n\n"));
    }

    #[test]
    fn test_prompt_embeds_schema_verbatim() {
        let chunks = vec![ContextChunk::new("text", 0.9)];
        let prompt = PromptBuilder::new(&chunks, &schema()).build().unwrap();

        assert!(prompt.contains("<json_schema>"));
        assert!(prompt.contains("\"maturity_date\""));
        assert!(prompt.contains("The maturity date of the loan."));
        assert!(prompt.contains("\"required\""));
    }

    #[test]
    fn test_prompt_demands_null_over_omission() {
        let chunks = vec![ContextChunk::new("text", 0.9)];
        let prompt = PromptBuilder::new(&chunks, &schema()).build().unwrap();
        assert!(prompt.contains("use the JSON value null"));
        assert!(prompt.contains("Do *not* omit the field"));
    }

    #[test]
    fn test_empty_chunks_skipped() {
        let chunks = vec![
            ContextChunk::new("", 0.9),
            ContextChunk::new("Usable text.", 0.8),
        ];
        let prompt = PromptBuilder::new(&chunks, &schema()).build().unwrap();
        assert!(prompt.contains("Usable text."));
    }

    #[test]
    fn test_all_empty_chunks_build_fails() {
        let chunks = vec![ContextChunk::new("", 0.9), ContextChunk::new("  ", 0.8)];
        assert!(PromptBuilder::new(&chunks, &schema()).build().is_none());
        assert!(PromptBuilder::new(&[], &schema()).build().is_none());
    }

    #[test]
    fn test_plain_prompt_has_no_chunk_labels() {
        let chunks = vec![ContextChunk::new("text", 0.9)];
        let prompt = PromptBuilder::new(&chunks, &schema()).build().unwrap();
        assert!(!prompt.contains("CHUNK_1"));
        assert!(!prompt.contains("field_citations"));
    }

    #[test]
    fn test_citation_prompt_numbers_chunks() {
        let chunks = vec![
            ContextChunk::new("First chunk.", 0.9),
            ContextChunk::new("Second chunk.", 0.8),
        ];
        let prompt = PromptBuilder::new(&chunks, &schema())
            .with_citations()
            .build()
            .unwrap();

        assert!(prompt.contains("[CHUNK_1]\nFirst chunk."));
        assert!(prompt.contains("[CHUNK_2]\nSecond chunk."));
        assert!(prompt.contains("\"field_citations\""));
        assert!(prompt.contains("\"extracted_data\""));
    }

    #[test]
    fn test_citation_labels_keep_original_positions() {
        let chunks = vec![
            ContextChunk::new("First chunk.", 0.9),
            ContextChunk::new("", 0.8),
            ContextChunk::new("Third chunk.", 0.7),
        ];
        let prompt = PromptBuilder::new(&chunks, &schema())
            .with_citations()
            .build()
            .unwrap();

        // The empty chunk leaves a numbering gap so labels still resolve
        // against the retrieved array.
        assert!(prompt.contains("[CHUNK_1]"));
        assert!(!prompt.contains("[CHUNK_2]"));
        assert!(prompt.contains("[CHUNK_3]"));
    }

    #[test]
    fn test_both_flavors_share_core_instructions() {
        let chunks = vec![ContextChunk::new("text", 0.9)];
        let plain = PromptBuilder::new(&chunks, &schema()).build().unwrap();
        let cited = PromptBuilder::new(&chunks, &schema())
            .with_citations()
            .build()
            .unwrap();

        for prompt in [&plain, &cited] {
            assert!(prompt.contains("Extract information *only* from the text"));
            assert!(prompt.contains("YYYY-MM-DD"));
            assert!(prompt.contains("start *immediately* with {"));
            assert!(prompt.contains("markdown code fences"));
        }
    }
}
