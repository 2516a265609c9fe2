// Shared prompt fragments used by every analysis kind.
// Each analysis kind keeps its own template in analysis/prompts.rs.

/// System prompt sent with every analysis call.
pub const ANALYST_SYSTEM: &str = "You are a senior technology industry analyst. \
    You write concise, factual research notes for enterprise technology buyers. \
    Use the exact section headings you are given, in bold, in the order given. \
    Do NOT add an introduction or a closing summary outside those sections.";

/// Appended to analysis prompts so replies stay inside the platform time budget.
/// Replace `{word_limit}` before sending.
pub const WORD_CEILING_INSTRUCTION: &str =
    "Keep the whole response under {word_limit} words. Prefer numbers over adjectives.";

/// Heading for web search context appended to a prompt.
pub const WEB_CONTEXT_HEADER: &str =
    "Recent web results (use only where relevant, do not cite URLs verbatim):";

pub fn word_ceiling(word_limit: u32) -> String {
    WORD_CEILING_INSTRUCTION.replace("{word_limit}", &word_limit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_ceiling_substitutes_limit() {
        assert_eq!(
            word_ceiling(350),
            "Keep the whole response under 350 words. Prefer numbers over adjectives."
        );
    }
}
