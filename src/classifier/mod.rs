//! Stream Classifier
//!
//! Classifies raw output chunks as password / sudo / generic prompts with a
//! heuristic confidence score. Pure and side-effect free: any input,
//! including empty or binary-looking chunks, yields a classification and
//! never a panic.
//!
//! The command family is resolved once per command and mapped to its pattern
//! table; chunks are then matched against that one table instead of
//! re-scanning every family per chunk.

pub mod patterns;

pub use patterns::{PromptKind, PromptPattern, ServerFamily};

use patterns::{
    CRITICAL_ERRORS, GENERIC_PROMPTS, LONG_RUNNING_SIGNATURES, MYSQL_PROMPTS, PSQL_PROMPTS,
    SSH_PROMPTS, SUDO_PROMPTS, SU_PROMPTS,
};

/// Classifications below this confidence are ignored by the auto-responder.
/// The bias is toward never sending a credential spuriously.
pub const AUTO_RESPONSE_CONFIDENCE: u8 = 80;

/// Result of classifying one output chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptClassification {
    /// The chunk asks for a credential
    pub is_password_prompt: bool,
    /// The chunk is a sudo credential request
    pub is_sudo_prompt: bool,
    /// The chunk is an interactive prompt that is not asking for a credential
    pub is_generic_prompt: bool,
    /// Heuristic confidence 0-100; max over all matching patterns
    pub confidence: u8,
}

impl PromptClassification {
    /// All-false, zero-confidence classification
    pub fn none() -> Self {
        Self::default()
    }

    /// True for prompts the password responder may answer
    pub fn is_auth_prompt(&self) -> bool {
        self.is_password_prompt || self.is_sudo_prompt
    }

    /// True when confident enough for an automatic credential response
    pub fn should_auto_respond(&self) -> bool {
        self.is_auth_prompt() && self.confidence >= AUTO_RESPONSE_CONFIDENCE
    }
}

/// Command family for prompt-table dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    Sudo,
    Ssh,
    Su,
    Mysql,
    Psql,
    Generic,
}

impl CommandFamily {
    /// Resolve by case-insensitive substring, first match wins
    pub fn resolve(command: &str) -> Self {
        let cmd = command.to_lowercase();
        const TABLE: &[(&str, CommandFamily)] = &[
            ("sudo", CommandFamily::Sudo),
            ("ssh", CommandFamily::Ssh),
            ("su", CommandFamily::Su),
            ("mysql", CommandFamily::Mysql),
            ("psql", CommandFamily::Psql),
        ];
        for (needle, family) in TABLE {
            if cmd.contains(needle) {
                return *family;
            }
        }
        CommandFamily::Generic
    }

    fn prompt_table(&self) -> &'static [PromptPattern] {
        match self {
            CommandFamily::Sudo => &SUDO_PROMPTS,
            CommandFamily::Ssh => &SSH_PROMPTS,
            CommandFamily::Su => &SU_PROMPTS,
            CommandFamily::Mysql => &MYSQL_PROMPTS,
            CommandFamily::Psql => &PSQL_PROMPTS,
            CommandFamily::Generic => &GENERIC_PROMPTS,
        }
    }
}

/// Classify one raw output chunk in the context of the command that
/// produced it.
///
/// Sudo-kind patterns are only reachable when the command itself contains
/// "sudo" (the sudo table is selected only for that family, and the fallback
/// table carries no sudo rows).
pub fn classify(chunk: &str, command: &str) -> PromptClassification {
    if chunk.is_empty() {
        return PromptClassification::none();
    }

    let family = CommandFamily::resolve(command);
    let mut result = scan_table(chunk, family.prompt_table());

    // Family table had nothing to say; fall back to the generic table.
    if result.confidence == 0 && family != CommandFamily::Generic {
        result = scan_table(chunk, &GENERIC_PROMPTS);
    }

    result
}

fn scan_table(chunk: &str, table: &[PromptPattern]) -> PromptClassification {
    let mut result = PromptClassification::none();
    for row in table {
        if row.pattern.is_match(chunk) {
            match row.kind {
                PromptKind::Password => result.is_password_prompt = true,
                PromptKind::Sudo => {
                    result.is_sudo_prompt = true;
                    result.is_password_prompt = true;
                }
                PromptKind::Generic => result.is_generic_prompt = true,
            }
            result.confidence = result.confidence.max(row.confidence);
        }
    }
    result
}

/// True when the command matches a known long-running signature
/// (dev servers, tunnels, watchers, log followers, process managers).
pub fn is_long_running(command: &str) -> bool {
    // `docker compose up -d` detaches on its own and exits.
    if command.contains("docker") && command.split_whitespace().any(|arg| arg == "-d") {
        return false;
    }
    LONG_RUNNING_SIGNATURES.iter().any(|re| re.is_match(command))
}

/// First readiness pattern matching the chunk for the command's server
/// family, returned as the pattern text for logging.
pub fn ready_match(chunk: &str, command: &str) -> Option<String> {
    let family = ServerFamily::resolve(command);
    patterns::ready_patterns(family)
        .iter()
        .find(|re| re.is_match(chunk))
        .map(|re| re.as_str().to_string())
}

/// First critical error pattern matching the output, if any
pub fn critical_error_match(output: &str) -> Option<String> {
    CRITICAL_ERRORS
        .iter()
        .find(|re| re.is_match(output))
        .map(|re| re.as_str().to_string())
}
