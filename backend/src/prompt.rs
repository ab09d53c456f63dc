use crate::config::AdapterConfig;
use shared::models::{ChatRequest, PromptMessage};
use std::fmt;
use std::str::FromStr;

/// Language the character is instructed to answer in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Russian,
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ru" | "russian" => Ok(Locale::Russian),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale '{other}' (expected ru or en)")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Russian => f.write_str("ru"),
            Locale::English => f.write_str("en"),
        }
    }
}

/// System instruction that puts the model in the character's shoes.
pub fn system_prompt(name: &str, personality: &str, locale: Locale) -> String {
    match locale {
        Locale::Russian => format!(
            "Ты — {name}. \n\
             \n\
             Твоя личность и характер:\n\
             {personality}\n\
             \n\
             Правила общения:\n\
             - Всегда отвечай ОТ ЛИЦА персонажа {name}\n\
             - Соблюдай описанный характер и манеру общения\n\
             - Отвечай на русском языке\n\
             - Будь последовательным в характере\n\
             - Делай ответы живыми и эмоциональными\n\
             - Отвечай кратко (2-4 предложения), но содержательно\n"
        ),
        Locale::English => format!(
            "You are {name}. \n\
             \n\
             Your personality and character:\n\
             {personality}\n\
             \n\
             Rules of conversation:\n\
             - Always answer AS the character {name}, in the first person\n\
             - Keep to the described character and manner of speaking\n\
             - Answer in English\n\
             - Stay consistent in character\n\
             - Make your answers lively and emotional\n\
             - Answer briefly (2-4 sentences) but with substance\n"
        ),
    }
}

/// Build the provider conversation: persona instruction, the trailing
/// history window, then the current message.
pub fn build_conversation(request: &ChatRequest, config: &AdapterConfig) -> Vec<PromptMessage> {
    let history = request.history();
    let window = &history[history.len().saturating_sub(config.history_window)..];

    let mut conversation = Vec::with_capacity(window.len() + 2);
    conversation.push(PromptMessage::system(system_prompt(
        request.character_name(),
        request.character_personality(),
        config.locale,
    )));

    for turn in window {
        let msg = if turn.is_character() {
            PromptMessage::assistant(turn.text())
        } else {
            PromptMessage::user(turn.text())
        };
        conversation.push(msg);
    }

    conversation.push(PromptMessage::user(request.message()));
    conversation
}
