// System prompts, canned replies, and provider instruction text

use crate::types::Language;

/// Static child-safety rules prepended to every knowledge query.
pub const SYSTEM_SAFETY_RULES: &str = "\
- You are a companion for an 8-year-old child.
- Use gentle, positive, and simple language.
- DO NOT discuss adult themes, violence, horror, or dark topics.
- DO NOT suggest dangerous activities.
- DO NOT scare the user.
- Answers should be short, clear, and engaging.
- Encourage curiosity and learning.
- If you use search, only summarize information from kid-friendly perspectives.";

/// Fixed apology used whenever the knowledge path fails.
pub const APOLOGY: &str = "Oh oh! I couldn't find that out right now.";

/// Shown when a provider returns an empty answer body.
pub const EMPTY_ANSWER_FALLBACK: &str = "I'm sorry, I couldn't find an answer to that.";

/// Acknowledgement accompanying a successfully generated picture.
pub const IMAGE_READY: &str = "Here is the picture I drew for you! I hope you like it!";

/// Shown when image generation fails or returns nothing.
pub const IMAGE_FAILED: &str =
    "Oh no! My magic crayons aren't working right now. Let's try again in a little while!";

/// Shown when the child asks for a picture without saying of what.
pub const IMAGE_CLARIFY: &str =
    "I'd love to draw for you! What should the picture show? Try: 'draw a picture of a happy dog'.";

pub struct SystemPrompts;

impl SystemPrompts {
    /// Language directive naming the locale and the audience.
    pub fn language_directive(language: Language) -> String {
        format!(
            "IMPORTANT: You must respond in {}. You are speaking to an 8-year-old child.",
            language.english_name()
        )
    }

    /// Full system prompt for the knowledge path. Order is fixed: safety
    /// rules, then the language directive, then the character's own prompt.
    pub fn knowledge(character_prompt: &str, language: Language) -> String {
        format!(
            "{}\n{}\n{}",
            SYSTEM_SAFETY_RULES,
            Self::language_directive(language),
            character_prompt
        )
    }

    /// Delivery instruction for the primary speech backend.
    pub fn speech_delivery(language: Language, voice: &str) -> String {
        format!(
            "You are a high-quality multilingual speech engine for children. \
             Please read the text provided in {lang}. \
             The audience is an 8-year-old child, so speak clearly, warmly, and naturally. \
             Respect the linguistic nuances of {lang} while keeping the character's energy \
             level consistent with the chosen voice: {voice}.",
            lang = language.english_name(),
            voice = voice
        )
    }

    /// Classification request wrapped around user-authored character text.
    pub fn safety_check(text: &str) -> String {
        format!(
            "Perform an 8-year-old child safety check on the following character description \
             or message. Flag any NSFW, violence, horror, or inappropriate themes. \
             Reply ONLY with a JSON object: {{\"safe\": boolean, \"reason\": \"string|null\"}}\n\n\
             Content: \"{}\"",
            text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_knowledge_prompt_contains_every_locale_name() {
        for language in Language::iter() {
            let prompt = SystemPrompts::knowledge("You are Sparky.", language);
            assert!(prompt.contains(language.english_name()));
            assert!(prompt.contains("8-year-old child"));
        }
    }

    #[test]
    fn test_knowledge_prompt_ordering() {
        let prompt = SystemPrompts::knowledge("You are Sparky.", Language::Fr);
        let rules = prompt.find("companion for an 8-year-old").unwrap();
        let directive = prompt.find("respond in French").unwrap();
        let persona = prompt.find("You are Sparky.").unwrap();
        assert!(rules < directive && directive < persona);
    }

    #[test]
    fn test_speech_delivery_names_voice_and_language() {
        let instruction = SystemPrompts::speech_delivery(Language::De, "Kore");
        assert!(instruction.contains("German"));
        assert!(instruction.contains("Kore"));
    }

    #[test]
    fn test_safety_check_embeds_content() {
        let prompt = SystemPrompts::safety_check("a spooky ghost");
        assert!(prompt.contains("a spooky ghost"));
        assert!(prompt.contains("safety check"));
    }
}
