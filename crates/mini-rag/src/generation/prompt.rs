//! Prompt templates for grounded, numerically cited answers

use crate::types::ChunkPayload;

/// Worked example showing the expected citation format
pub const CITATION_EXAMPLE: &str = "The sky appears blue due to a phenomenon called Rayleigh scattering [1]. \
This is where shorter wavelengths of light are scattered more effectively by the particles in the atmosphere [2].";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Enumerate passages as `Source [i]` blocks, numbered from 1 in the
    /// order given (the reranked order, not the search rank)
    pub fn build_context(passages: &[ChunkPayload]) -> String {
        let mut context = String::new();

        for (i, passage) in passages.iter().enumerate() {
            context.push_str(&format!(
                "Source [{}]: (From File: {}, Chunk: {})\n{}\n\n",
                i + 1,
                passage.source,
                passage.chunk_num,
                passage.text
            ));
        }

        context
    }

    /// Build the full grounding prompt
    pub fn build_rag_prompt(query: &str, passages: &[ChunkPayload]) -> String {
        format!(
            r#"You are a helpful assistant. Your task is to answer the user's query based ONLY on the provided sources.
- Do not use any prior knowledge.
- You MUST cite the sources you use in your answer. To cite a source, use the format [X] where X is the source number.
- Your answer must be grounded in the provided sources. If the answer is not in the sources, state that clearly.
- List the citations at the end of the sentence or paragraph where the information was used.

Here is an example of a good answer:
-----------------
{example}
-----------------

Provided Sources:
---
{context}---

User Query: {query}

Answer:
"#,
            example = CITATION_EXAMPLE,
            context = Self::build_context(passages),
            query = query,
        )
    }
}
