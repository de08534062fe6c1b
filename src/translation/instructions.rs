/*!
 * Backend instructions for each translation strategy.
 *
 * The orchestrator decides what the backend is asked to do; backends only
 * transport the instruction. Dictionary lookups demand a fixed answer shape
 * that `DictionaryEntry::parse` can read back.
 */

use crate::language_utils::LanguageTag;

use super::classifier::Strategy;
use super::domain::DomainTag;

/// Number of usage examples a dictionary answer must contain
pub const DICTIONARY_EXAMPLE_COUNT: usize = 3;

const MEANING_LABEL: &str = "Meaning";
const PART_OF_SPEECH_LABEL: &str = "Part of speech";
const PRONUNCIATION_LABEL: &str = "Pronunciation";
const EXPLANATION_LABEL: &str = "Explanation";
const EXAMPLES_LABEL: &str = "Examples";

/// Instruction template with `{source_language}`, `{target_language}` and
/// `{domain}` placeholders
#[derive(Debug, Clone)]
pub struct InstructionTemplate {
    template: &'static str,
}

impl InstructionTemplate {
    pub const LITERAL: &'static str = "You are a direct translator, not an interpreter.
Translate the text from {source_language} to {target_language} literally and directly.
Do NOT interpret idioms, slang, or figurative meanings.
Keep the translation clear and grammatically natural, but faithful to the original words.
Return only the translation, with no explanations or language labels.";

    pub const DOMAIN: &'static str = "You are a professional translator specializing in the {domain} field.
Translate the text from {source_language} to {target_language}.
Use appropriate {domain} terminology and maintain a professional tone.
Provide a natural translation that sounds native in {target_language}.
Return only the translation, with no explanations.";

    pub const SLANG: &'static str = "You are an expert in modern slang.
Translate or interpret the slang phrase from {source_language} to {target_language}.
Give the most natural and concise equivalent in {target_language}.
Do NOT explain or add commentary, just output the result.";

    pub const IDIOM: &'static str = "You are an idiom interpreter.
Translate the idiom from {source_language} to {target_language}.
Give ONLY the equivalent expression in {target_language}, or its meaning if none exists.
Do NOT include language labels or explanations.";

    pub const DICTIONARY: &'static str = "You are a professional bilingual dictionary assistant.
Analyze the term from {source_language}{domain_clause}.
All explanations, examples and the part of speech must be written in {target_language}.
Return your answer in this EXACT format:

Meaning: <common meaning in {target_language}>
Part of speech: <part of speech in {target_language}>
Pronunciation: <IPA for English, local pronunciation otherwise>
Explanation: <one simple sentence in {target_language}>
Examples:
1. <example sentence> – <translation in {target_language}>
2. <example sentence> – <translation in {target_language}>
3. <example sentence> – <translation in {target_language}>";

    pub fn for_strategy(strategy: Strategy) -> Self {
        let template = match strategy {
            Strategy::LiteralSentence => Self::LITERAL,
            Strategy::DomainSentence => Self::DOMAIN,
            Strategy::SlangPhrase => Self::SLANG,
            Strategy::IdiomPhrase => Self::IDIOM,
            Strategy::DictionaryLookup => Self::DICTIONARY,
        };
        Self { template }
    }

    /// Render the template with the given languages and domain
    pub fn render(&self, source: LanguageTag, target: LanguageTag, domain: Option<DomainTag>) -> String {
        let domain_name = domain.map(|d| d.label()).unwrap_or("General");
        let domain_clause = match domain {
            Some(tag) if tag.is_professional() => format!(" in the context of {}", tag.label()),
            _ => String::new(),
        };

        self.template
            .replace("{source_language}", source.english_name())
            .replace("{target_language}", target.english_name())
            .replace("{domain_clause}", &domain_clause)
            .replace("{domain}", domain_name)
    }
}

/// Instruction handed to a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Role and rules for the model
    pub system: String,
    /// The text to work on, labelled for the strategy
    pub user: String,
}

impl Instruction {
    /// Build the instruction for a classified request
    pub fn build(
        text: &str,
        source: LanguageTag,
        target: LanguageTag,
        strategy: Strategy,
        domain: Option<DomainTag>,
    ) -> Self {
        let system = InstructionTemplate::for_strategy(strategy).render(source, target, domain);
        let label = match strategy {
            Strategy::LiteralSentence | Strategy::DomainSentence => "Text",
            Strategy::SlangPhrase => "Slang",
            Strategy::IdiomPhrase => "Idiom",
            Strategy::DictionaryLookup => "Word",
        };

        Self {
            system,
            user: format!("{}: {}", label, text),
        }
    }

    /// Single prompt for backends without a separate system role
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// One usage example of a dictionary answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryExample {
    pub sentence: String,
    pub translation: Option<String>,
}

/// A dictionary answer read back from backend output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub meaning: String,
    pub part_of_speech: String,
    pub pronunciation: String,
    pub explanation: String,
    pub examples: Vec<DictionaryExample>,
}

impl DictionaryEntry {
    /// Parse backend output in the dictionary shape
    ///
    /// Returns `None` when any field is missing or the examples are not all there.
    pub fn parse(output: &str) -> Option<Self> {
        let mut meaning = None;
        let mut part_of_speech = None;
        let mut pronunciation = None;
        let mut explanation = None;
        let mut examples = Vec::new();

        for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some((label, value)) = split_label(line) {
                let value = value.to_string();
                match label.as_str() {
                    l if l.eq_ignore_ascii_case(MEANING_LABEL) => meaning = Some(value),
                    l if l.eq_ignore_ascii_case(PART_OF_SPEECH_LABEL) => part_of_speech = Some(value),
                    l if l.eq_ignore_ascii_case(PRONUNCIATION_LABEL) => pronunciation = Some(value),
                    l if l.eq_ignore_ascii_case(EXPLANATION_LABEL) => explanation = Some(value),
                    _ => {}
                }
                continue;
            }

            if let Some(example) = parse_example(line) {
                examples.push(example);
            }
        }

        if examples.len() < DICTIONARY_EXAMPLE_COUNT {
            return None;
        }
        examples.truncate(DICTIONARY_EXAMPLE_COUNT);

        Some(Self {
            meaning: non_empty(meaning?)?,
            part_of_speech: non_empty(part_of_speech?)?,
            pronunciation: non_empty(pronunciation?)?,
            explanation: non_empty(explanation?)?,
            examples,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Split "Label: value" lines; the examples header has no value and is skipped
fn split_label(line: &str) -> Option<(String, &str)> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim();
    if label.eq_ignore_ascii_case(EXAMPLES_LABEL) {
        return Some((label.to_string(), value.trim()));
    }
    if label.is_empty() || label.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((label.to_string(), value.trim()))
}

/// Parse "1. sentence – translation"
fn parse_example(line: &str) -> Option<DictionaryExample> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let rest = line[digits_end..].strip_prefix('.')?.trim();
    if rest.is_empty() {
        return None;
    }

    let (sentence, translation) = match rest.split_once(" – ").or_else(|| rest.split_once(" - ")) {
        Some((sentence, translation)) => (sentence.trim(), Some(translation.trim().to_string())),
        None => (rest, None),
    };

    Some(DictionaryExample {
        sentence: sentence.to_string(),
        translation,
    })
}
