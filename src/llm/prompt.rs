//! Fixed stylist prompts.
//!
//! Both backends get the same persona and the same request for named sections. The
//! occasion text is the single substitution point and is inserted verbatim.

use crate::llm::models::BackendKind;

/// Persona sent as a separate system instruction to the cloud backend.
pub const STYLIST_SYSTEM_INSTRUCTION: &str = "You are an expert personal stylist. Your task is to \
analyze a user's wardrobe image and suggest the best possible outfit for a specific occasion. \
Your response MUST be structured, starting with a clear outfit recommendation, and then \
justifying the choice based on the items visible in the image. If a perfect item isn't visible, \
suggest a suitable alternative. Be encouraging and concise.";

/// Section headings the local model is asked to produce.
pub const LOCAL_SECTIONS: [&str; 3] = ["Suggested Outfit", "Stylist Notes", "Visible Items Used"];

/// Section headings the cloud model is asked to produce.
pub const CLOUD_SECTIONS: [&str; 3] = ["Suggested Outfit", "Stylist Notes", "Items Used"];

/// Prompt text for one outfit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylistPrompt {
    /// Sent out of band when the backend supports it; the local backend folds it
    /// into `user_prompt` instead.
    pub system_instruction: Option<String>,
    pub user_prompt: String,
}

impl StylistPrompt {
    /// Single-string prompt for the Ollama generate endpoint.
    pub fn local(occasion: &str) -> Self {
        let user_prompt = format!(
            "You are an expert personal stylist. Analyze the entire wardrobe in the image. \
             Based on the items and accessories visible, what is the best outfit \
             for the following occasion: **{}**? \
             Suggest a complete look and justify your choices. \
             Structure your response with the sections: {}.",
            occasion,
            quote_sections(&LOCAL_SECTIONS)
        );

        Self {
            system_instruction: None,
            user_prompt,
        }
    }

    /// System instruction plus user prompt for the Gemini endpoint.
    pub fn cloud(occasion: &str) -> Self {
        let user_prompt = format!(
            "Based on the attached image of my wardrobe, what is the best outfit \
             for the following occasion: **{}**? \
             Please suggest a complete look (main item, accessories, color coordination) \
             using only the clothes and accessories visible. \
             Structure your response with the sections: {}.",
            occasion,
            quote_sections(&CLOUD_SECTIONS)
        );

        Self {
            system_instruction: Some(STYLIST_SYSTEM_INSTRUCTION.to_string()),
            user_prompt,
        }
    }

    pub fn for_backend(kind: BackendKind, occasion: &str) -> Self {
        match kind {
            BackendKind::Local => Self::local(occasion),
            BackendKind::Cloud => Self::cloud(occasion),
        }
    }
}

// 'A', 'B', and 'C'
fn quote_sections(sections: &[&str]) -> String {
    match sections {
        [] => String::new(),
        [only] => format!("'{}'", only),
        [init @ .., last] => {
            let head: Vec<String> = init.iter().map(|s| format!("'{}'", s)).collect();
            format!("{}, and '{}'", head.join(", "), last)
        }
    }
}
