//! Signature-based input heuristics.
//!
//! Pure blocklist matching over strings: no parsing, no context. Legitimate
//! input containing SQL keywords or shell punctuation is rejected too, and
//! that is part of the observable behavior.

use regex::Regex;
use std::sync::LazyLock;

use crate::security::violation::ViolationKind;

/// Suspicious-content signatures, checked in order. The first hit decides
/// which category the request is rejected under.
static SUSPICIOUS_PATTERNS: LazyLock<Vec<(ViolationKind, Regex)>> = LazyLock::new(|| {
    let patterns: [(ViolationKind, &str); 8] = [
        // quote, or the literal escape sequences \x27 and \x2D\x2D
        (ViolationKind::SqlInjection, r"(?i)'|\\x27|\\x2D\\x2D"),
        (
            ViolationKind::SqlInjection,
            r"(?i)union|select|insert|delete|update|drop|create|alter|exec|execute",
        ),
        (ViolationKind::Xss, r"(?i)<script[^>]*>.*?</script>"),
        (ViolationKind::Xss, r"(?i)<iframe[^>]*>.*?</iframe>"),
        (ViolationKind::Xss, r"(?i)javascript:"),
        (ViolationKind::Xss, r"(?i)on[A-Za-z0-9_]+\s*="),
        (ViolationKind::CommandInjection, r#"[;&|`$<>(){}\[\]\\'"]"#),
        (ViolationKind::PathTraversal, r"\.\./"),
    ];

    patterns
        .into_iter()
        .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("invalid suspicious pattern")))
        .collect()
});

const OS_COMMANDS: &[&str] = &[
    "rm", "del", "delete", "mkdir", "rmdir", "mv", "cp", "cat", "ls", "dir", "chmod", "chown",
    "sudo", "su", "passwd", "kill", "killall", "ps", "wget", "curl", "nc", "netcat", "ssh", "scp",
    "ftp", "telnet", "ping", "nslookup", "dig", "whoami", "id", "uname", "which", "locate", "find",
    "grep", "awk", "sed", "sort", "head", "tail", "tar", "zip", "unzip", "gzip", "gunzip",
    "python", "node", "npm", "pip", "bash", "sh", "zsh", "csh", "tcsh", "fish", "powershell",
    "cmd", "net", "tasklist", "taskkill", "systemctl", "service", "crontab", "at",
];

/// A command word at the start, after whitespace, or after a shell
/// separator, followed by whitespace or end of input.
static OS_COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let words = OS_COMMANDS.join("|");
    let pattern = format!(
        r"^(?:{words})\s|\s(?:{words})\s|[;&|](?:{words})\s|^(?:{words})$|\s(?:{words})$"
    );
    Regex::new(&pattern).expect("invalid os command pattern")
});

const TRAVERSAL_SEQUENCES: &[&str] = &[
    "../",
    "..\\",
    "..\\/",
    "../\\",
    "%2e%2e%2f",
    "%2e%2e%5c",
    "%2e%2e/",
    "..%2f",
    "..%5c",
    "%252e%252e%252f",
];

/// Checked against the percent-decoded URL.
static SUSPICIOUS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\.[/\\]|(?i:%2e%2e[/\\])|(?i:%252e%252e[/\\])|(?i:%00)|[\x00-\x1f\x7f-\x9f]")
        .expect("invalid url pattern")
});

const SHELL_METACHARACTERS: &[char] = &[
    ';', '&', '|', '`', '$', '<', '>', '(', ')', '{', '}', '[', ']', '\\', '\'', '"',
];

/// Return the category of the first suspicious signature found in `value`.
pub fn classify_suspicious(value: &str) -> Option<ViolationKind> {
    SUSPICIOUS_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(value))
        .map(|(kind, _)| *kind)
}

/// True when `value` looks like it invokes an OS command.
pub fn contains_os_command(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    OS_COMMAND_PATTERN.is_match(&value.to_lowercase())
}

/// False for empty strings and anything carrying a traversal sequence.
pub fn is_valid_path(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let lower = value.to_lowercase();
    !TRAVERSAL_SEQUENCES.iter().any(|seq| lower.contains(seq))
}

/// True when a decoded URL carries traversal, NUL or control characters.
pub fn is_suspicious_url(decoded: &str) -> bool {
    SUSPICIOUS_URL_PATTERN.is_match(decoded)
}

/// Strip shell metacharacters, collapse whitespace and cap the length at
/// 1000 characters. Used before echoing client-supplied text into logs.
pub fn sanitize_input(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !SHELL_METACHARACTERS.contains(c))
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(1000)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_signatures() {
        assert_eq!(classify_suspicious("1' OR '1'='1"), Some(ViolationKind::SqlInjection));
        assert_eq!(classify_suspicious("UNION SELECT password"), Some(ViolationKind::SqlInjection));
        assert_eq!(classify_suspicious(r"id=\x27"), Some(ViolationKind::SqlInjection));
        // Keyword matching is substring based
        assert_eq!(classify_suspicious("Updated notes"), Some(ViolationKind::SqlInjection));
    }

    #[test]
    fn test_xss_signatures() {
        assert_eq!(classify_suspicious("<script>alert(1)</script>"), Some(ViolationKind::Xss));
        assert_eq!(classify_suspicious("<IFRAME src=x></iframe>"), Some(ViolationKind::Xss));
        assert_eq!(classify_suspicious("JavaScript:void(0)"), Some(ViolationKind::Xss));
        assert_eq!(classify_suspicious("img onerror = x"), Some(ViolationKind::Xss));
    }

    #[test]
    fn test_shell_and_traversal_signatures() {
        assert_eq!(classify_suspicious("a; b"), Some(ViolationKind::CommandInjection));
        assert_eq!(classify_suspicious("${HOME}"), Some(ViolationKind::CommandInjection));
        assert_eq!(classify_suspicious("../etc/passwd"), Some(ViolationKind::PathTraversal));
    }

    #[test]
    fn test_clean_strings_pass() {
        assert_eq!(classify_suspicious("First Example"), None);
        assert_eq!(classify_suspicious("A plain description, with commas."), None);
    }

    #[test]
    fn test_os_commands() {
        assert!(contains_os_command("rm -rf /"));
        assert!(contains_os_command("please run CURL now"));
        assert!(contains_os_command("whoami"));
        assert!(contains_os_command("x|ls -la"));
        assert!(contains_os_command("look at"));
        assert!(!contains_os_command("format"));
        assert!(!contains_os_command("First Example"));
        assert!(!contains_os_command(""));
    }

    #[test]
    fn test_path_validity() {
        assert!(is_valid_path("docs/readme.md"));
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("..\\windows"));
        assert!(!is_valid_path("%2E%2E%2Fetc"));
        assert!(!is_valid_path("a/..%2fb"));
        assert!(!is_valid_path("%252e%252e%252f"));
    }

    #[test]
    fn test_suspicious_url() {
        assert!(is_suspicious_url("/examples/../secret"));
        assert!(is_suspicious_url("/examples/%2E%2E/secret"));
        assert!(is_suspicious_url("/a%00b"));
        assert!(is_suspicious_url("/a\u{0}b"));
        assert!(is_suspicious_url("/a\u{85}b"));
        assert!(!is_suspicious_url("/examples?page=2"));
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  curl  <evil>;\n rm  "), "curl evil rm");
        assert_eq!(sanitize_input(&"a".repeat(1500)).len(), 1000);
    }
}
