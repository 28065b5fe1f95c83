//! Pattern Tables
//!
//! Static heuristic tables used by the classifier: per-family authentication
//! prompt patterns, long-running command signatures, per-family readiness
//! patterns, and critical error patterns for failure classification.
//!
//! All tables are compiled once. Pattern order matters: more specific
//! patterns come before generic ones so the highest-confidence match wins
//! first on equal scores.
//!
//! These are best-effort heuristics for known tools. Unrecognized tools fall
//! through to the generic tables; that degradation is intentional.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// What a matched prompt pattern tells us about the chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A credential is being requested
    Password,
    /// A sudo-specific credential request
    Sudo,
    /// An interactive prompt that is not asking for a credential
    Generic,
}

/// A single (regex, confidence) row in a family table
#[derive(Debug)]
pub struct PromptPattern {
    pub pattern: Regex,
    /// Heuristic confidence 0-100
    pub confidence: u8,
    pub kind: PromptKind,
}

/// Compile a static table, skipping rows that fail to compile
fn compile(rows: &[(&str, u8, PromptKind)]) -> Vec<PromptPattern> {
    rows.iter()
        .filter_map(|(raw, confidence, kind)| match Regex::new(raw) {
            Ok(pattern) => Some(PromptPattern {
                pattern,
                confidence: *confidence,
                kind: *kind,
            }),
            Err(e) => {
                warn!("Failed to compile prompt pattern '{}': {}", raw, e);
                None
            }
        })
        .collect()
}

fn compile_plain(rows: &[&str]) -> Vec<Regex> {
    rows.iter()
        .filter_map(|raw| match Regex::new(raw) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Failed to compile pattern '{}': {}", raw, e);
                None
            }
        })
        .collect()
}

/// Prompt patterns evaluated only when the command itself contains "sudo"
pub static SUDO_PROMPTS: Lazy<Vec<PromptPattern>> = Lazy::new(|| {
    compile(&[
        (r"(?i)\[sudo\] password for [^:\n]*:", 95, PromptKind::Sudo),
        (r"(?i)password for [^:\n]*:", 90, PromptKind::Sudo),
        (r"(?i)sudo: a password is required", 85, PromptKind::Sudo),
        (r"(?i)password\s*:", 80, PromptKind::Password),
    ])
});

pub static SSH_PROMPTS: Lazy<Vec<PromptPattern>> = Lazy::new(|| {
    compile(&[
        (r"(?i)[^@\s]+@[^\s']+'s password:", 95, PromptKind::Password),
        (r"(?i)enter passphrase for key", 92, PromptKind::Password),
        (r"(?i)password:", 90, PromptKind::Password),
        (
            r"(?i)are you sure you want to continue connecting",
            85,
            PromptKind::Generic,
        ),
        (r"(?i)\(yes/no(/\[fingerprint\])?\)", 80, PromptKind::Generic),
    ])
});

pub static SU_PROMPTS: Lazy<Vec<PromptPattern>> =
    Lazy::new(|| compile(&[(r"(?i)password\s*:", 90, PromptKind::Password)]));

pub static MYSQL_PROMPTS: Lazy<Vec<PromptPattern>> = Lazy::new(|| {
    compile(&[
        (r"(?i)enter password\s*:", 92, PromptKind::Password),
        (r"(?i)password\s*:", 80, PromptKind::Password),
    ])
});

pub static PSQL_PROMPTS: Lazy<Vec<PromptPattern>> = Lazy::new(|| {
    compile(&[
        (r"(?i)password for user [^:\n]*:", 92, PromptKind::Password),
        (r"(?i)password\s*:", 80, PromptKind::Password),
    ])
});

/// Fallback table for unrecognized commands. Deliberately contains no
/// sudo-kind rows: a command without "sudo" can never classify as a sudo
/// prompt.
pub static GENERIC_PROMPTS: Lazy<Vec<PromptPattern>> = Lazy::new(|| {
    compile(&[
        (r"(?i)password\s*:\s*$", 75, PromptKind::Password),
        (r"(?i)passphrase[^:\n]*:", 70, PromptKind::Password),
        (r"(?i)\[y/n\]", 60, PromptKind::Generic),
        (r"(?i)\(y(es)?/no?\)", 60, PromptKind::Generic),
        (r"(?i)do you want to continue", 60, PromptKind::Generic),
        (r"(?i)are you sure", 55, PromptKind::Generic),
        (r"(?i)press any key to continue", 50, PromptKind::Generic),
    ])
});

/// Signatures of commands that start a foreground server, watcher, tunnel
/// or log follower and will not exit on their own.
pub static LONG_RUNNING_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)\bnpm\s+(run\s+)?(dev|start|serve|watch)\b",
        r"(?i)\byarn\s+(run\s+)?(dev|start|serve|watch)\b",
        r"(?i)\bpnpm\s+(run\s+)?(dev|start|serve|watch)\b",
        r"(?i)\bnode\s+\S*(server|app|index)\.[mc]?js\b",
        r"(?i)\bnodemon\b",
        r"(?i)\bvite\b",
        r"(?i)\bnext\s+(dev|start)\b",
        r"(?i)\bng\s+serve\b",
        r"(?i)\bwebpack\b.*--watch",
        r"(?i)\bpython3?\s+-m\s+http\.server\b",
        r"(?i)\bmanage\.py\s+runserver\b",
        r"(?i)\bflask\s+run\b",
        r"(?i)\buvicorn\b",
        r"(?i)\bgunicorn\b",
        r"(?i)\brails\s+s(erver)?\b",
        r"(?i)\bphp\s+artisan\s+serve\b",
        r"(?i)\bdocker(-compose)?\s+(compose\s+)?up\b",
        r"(?i)\btail\s+-[a-z]*f",
        r"(?i)\bngrok\b",
        r"(?i)\bssh\s+-\S*[LRN]\b",
        r"(?i)\bpm2\s+(logs|monit)\b",
        r"(?i)\bcargo\s+watch\b",
        r"(?i)^watch\s+",
    ])
});

/// Server family for readiness dispatch, resolved from the command string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerFamily {
    Node,
    Python,
    Ruby,
    Php,
    Docker,
    Tunnel,
    Tail,
    Generic,
}

impl ServerFamily {
    /// Resolve by case-insensitive substring, first match wins
    pub fn resolve(command: &str) -> Self {
        let cmd = command.to_lowercase();
        const TABLE: &[(&str, ServerFamily)] = &[
            ("npm", ServerFamily::Node),
            ("yarn", ServerFamily::Node),
            ("pnpm", ServerFamily::Node),
            ("nodemon", ServerFamily::Node),
            ("node", ServerFamily::Node),
            ("vite", ServerFamily::Node),
            ("next", ServerFamily::Node),
            ("ng serve", ServerFamily::Node),
            ("webpack", ServerFamily::Node),
            ("python", ServerFamily::Python),
            ("manage.py", ServerFamily::Python),
            ("flask", ServerFamily::Python),
            ("uvicorn", ServerFamily::Python),
            ("gunicorn", ServerFamily::Python),
            ("rails", ServerFamily::Ruby),
            ("puma", ServerFamily::Ruby),
            ("artisan", ServerFamily::Php),
            ("php", ServerFamily::Php),
            ("docker", ServerFamily::Docker),
            ("ngrok", ServerFamily::Tunnel),
            ("ssh -", ServerFamily::Tunnel),
            ("tail", ServerFamily::Tail),
        ];
        for (needle, family) in TABLE {
            if cmd.contains(needle) {
                return *family;
            }
        }
        ServerFamily::Generic
    }
}

static NODE_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)listening on",
        r"(?i)ready in \d+",
        r"(?i)compiled successfully",
        r"(?i)local:\s*https?://",
        r"(?i)started server on",
        r"(?i)server (is )?running",
        r"(?i)app running at",
    ])
});

static PYTHON_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)running on https?://",
        r"(?i)starting development server",
        r"(?i)uvicorn running on",
        r"(?i)application startup complete",
        r"(?i)booting worker",
        r"(?i)serving http",
    ])
});

static RUBY_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)listening on",
        r"(?i)puma starting",
        r"(?i)use ctrl-c to stop",
    ])
});

static PHP_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)server running on",
        r"(?i)development server \S+ started",
        r"(?i)started",
    ])
});

static DOCKER_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)attaching to",
        r"(?i)container \S+\s+(started|running)",
        r"(?i)listening on",
    ])
});

static TUNNEL_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)forwarding\s",
        r"(?i)tunnel established",
        r"(?i)session status\s+online",
        r"(?i)started tunnel",
    ])
});

// A log follower is "ready" as soon as it produces anything.
static TAIL_READY: Lazy<Vec<Regex>> = Lazy::new(|| compile_plain(&[r"\S"]));

static GENERIC_READY: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)listening on",
        r"(?i)server (is )?running",
        r"(?i)running at",
        r"(?i)\bready\b",
        r"(?i)\bstarted\b",
        r"(?i)compiled successfully",
        r"(?i)watching for (file )?changes",
    ])
});

/// Readiness table for a server family
pub fn ready_patterns(family: ServerFamily) -> &'static [Regex] {
    match family {
        ServerFamily::Node => &NODE_READY,
        ServerFamily::Python => &PYTHON_READY,
        ServerFamily::Ruby => &RUBY_READY,
        ServerFamily::Php => &PHP_READY,
        ServerFamily::Docker => &DOCKER_READY,
        ServerFamily::Tunnel => &TUNNEL_READY,
        ServerFamily::Tail => &TAIL_READY,
        ServerFamily::Generic => &GENERIC_READY,
    }
}

/// Output patterns that mark a command as failed regardless of stderr noise.
/// Stderr capture alone never fails a command; only these and the exit code
/// decide.
pub static CRITICAL_ERRORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_plain(&[
        r"(?i)command not found",
        r"(?i)permission denied",
        r"(?i)no such file or directory",
        r"(?i)cannot execute",
        r"(?i)syntax error",
    ])
});
