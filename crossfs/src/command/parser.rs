//! Splits a command line into its executable token and the untouched rest.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::WINDOWS_EXECUTABLE_EXTENSIONS;
use crate::error::GuardError;
use crate::platform::{PlatformProfile, ShellDialect};

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%[A-Za-z_][A-Za-z0-9_()]*%").expect("environment reference pattern is valid")
});

/// Quoting used around the executable in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    /// POSIX only.
    Single,
}

/// Result of [`parse_executable`]. Borrows from the parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedExecutable<'a> {
    /// Executable text with any surrounding quotes removed.
    pub executable: &'a str,
    pub quote: Option<QuoteStyle>,
    /// Everything after the token, including its leading whitespace.
    pub remainder: &'a str,
}

/// Whether `text` contains a `%NAME%` reference.
pub fn has_env_reference(text: &str) -> bool {
    ENV_REFERENCE.is_match(text)
}

/// Locate the executable token at the start of `command`.
///
/// Rules, first match wins:
/// 1. a leading `"` runs to the next `"`;
/// 2. on POSIX, a leading `'` runs to the next `'`;
/// 3. on Windows, a first word containing `%NAME%` may absorb following words
///    until the text ends in an executable extension, so a variable can expand
///    to a directory with spaces. Without an extension the token is the first
///    word, unless the next word reads as the rest of that path (for example
///    `%ProgramFiles%\My App\tool`), which is `MalformedCommand`;
/// 4. otherwise the token ends at the first whitespace.
///
/// Leading whitespace is skipped. A closing quote must be followed by
/// whitespace or the end of input.
pub fn parse_executable<'a>(
    command: &'a str,
    profile: &PlatformProfile,
) -> Result<ParsedExecutable<'a>, GuardError> {
    let command = command.trim_start();
    let dialect = profile.dialect();
    let malformed = |reason: &'static str| GuardError::MalformedCommand {
        command: command.to_string(),
        reason,
        platform: profile.name(),
    };

    let Some(first) = command.chars().next() else {
        return Err(malformed("empty command"));
    };

    let quote = match first {
        '"' => Some(QuoteStyle::Double),
        '\'' if dialect == ShellDialect::Posix => Some(QuoteStyle::Single),
        _ => None,
    };

    if let Some(style) = quote {
        let body = &command[1..];
        let close = body
            .find(first)
            .ok_or_else(|| malformed("unterminated quote in executable"))?;
        let remainder = &body[close + 1..];
        if remainder.starts_with(|c: char| !c.is_whitespace()) {
            return Err(malformed("text directly after the executable's closing quote"));
        }
        return Ok(ParsedExecutable {
            executable: &body[..close],
            quote: Some(style),
            remainder,
        });
    }

    let end = match dialect {
        ShellDialect::Cmd => env_token_end(command).map_err(malformed)?,
        ShellDialect::Posix => None,
    }
    .unwrap_or_else(|| first_word_end(command));

    Ok(ParsedExecutable {
        executable: &command[..end],
        quote: None,
        remainder: &command[end..],
    })
}

fn first_word_end(text: &str) -> usize {
    text.find(char::is_whitespace).unwrap_or(text.len())
}

fn env_token_end(command: &str) -> Result<Option<usize>, &'static str> {
    let first_end = first_word_end(command);
    if !has_env_reference(&command[..first_end]) {
        return Ok(None);
    }

    let mut end = first_end;
    loop {
        if has_executable_extension(&command[..end]) {
            return Ok(Some(end));
        }
        let Some(next_start) = command[end..]
            .find(|c: char| !c.is_whitespace())
            .map(|offset| end + offset)
        else {
            break;
        };
        end = next_start + first_word_end(&command[next_start..]);
    }

    let rest = command[first_end..].trim_start();
    if continues_path(&rest[..first_word_end(rest)]) {
        return Err("variable-rooted executable path with spaces must be quoted or end in an executable extension");
    }
    Ok(Some(first_end))
}

/// A relative `a\b` word, as opposed to an option, an absolute path or
/// another variable.
fn continues_path(word: &str) -> bool {
    word.contains('\\') && !word.contains(':') && !word.starts_with(['/', '-', '\\', '"', '%'])
}

fn has_executable_extension(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    WINDOWS_EXECUTABLE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_posix(command: &str) -> ParsedExecutable<'_> {
        parse_executable(command, &PlatformProfile::linux()).unwrap()
    }

    fn parse_windows(command: &str) -> ParsedExecutable<'_> {
        parse_executable(command, &PlatformProfile::windows()).unwrap()
    }

    #[test]
    fn double_quoted_token_keeps_spaces() {
        let parsed = parse_windows("\"C:\\Program Files\\My App\\tool.exe\" --flag");
        assert_eq!(parsed.executable, "C:\\Program Files\\My App\\tool.exe");
        assert_eq!(parsed.quote, Some(QuoteStyle::Double));
        assert_eq!(parsed.remainder, " --flag");
    }

    #[test]
    fn single_quotes_only_on_posix() {
        let parsed = parse_posix("'/usr/local/My Tool/bin/tool' --version");
        assert_eq!(parsed.executable, "/usr/local/My Tool/bin/tool");
        assert_eq!(parsed.quote, Some(QuoteStyle::Single));

        let parsed = parse_windows("'tool' x");
        assert_eq!(parsed.executable, "'tool'");
        assert_eq!(parsed.quote, None);
    }

    #[test]
    fn env_reference_token_absorbs_spaces_until_extension() {
        let parsed = parse_windows("%ProgramFiles%\\My App\\tool.exe --flag value");
        assert_eq!(parsed.executable, "%ProgramFiles%\\My App\\tool.exe");
        assert_eq!(parsed.remainder, " --flag value");
    }

    #[test]
    fn env_reference_without_extension_falls_back_to_first_word() {
        let parsed = parse_windows("%ComSpec% /C dir");
        assert_eq!(parsed.executable, "%ComSpec%");
        assert_eq!(parsed.remainder, " /C dir");
    }

    #[test]
    fn env_reference_ending_first_word_stops_there() {
        let parsed = parse_windows("%SystemRoot%\\system32\\where.exe git.exe");
        assert_eq!(parsed.executable, "%SystemRoot%\\system32\\where.exe");
        assert_eq!(parsed.remainder, " git.exe");
    }

    #[test]
    fn env_path_split_at_a_space_without_extension_is_malformed() {
        let err = parse_executable("%ProgramFiles%\\My App\\tool --flag", &PlatformProfile::windows())
            .unwrap_err();
        assert_eq!(err.code(), "MALFORMED_COMMAND");
    }

    #[test]
    fn env_path_without_extension_followed_by_arguments_is_first_word() {
        let parsed = parse_windows("%SystemRoot%\\system32\\cmd /c dir C:\\x");
        assert_eq!(parsed.executable, "%SystemRoot%\\system32\\cmd");
        assert_eq!(parsed.remainder, " /c dir C:\\x");
    }

    #[test]
    fn percent_syntax_is_plain_text_on_posix() {
        let parsed = parse_posix("%X%/my tool.exe");
        assert_eq!(parsed.executable, "%X%/my");
    }

    #[test]
    fn bare_token_ends_at_whitespace() {
        let parsed = parse_posix("  /bin/ls -la");
        assert_eq!(parsed.executable, "/bin/ls");
        assert_eq!(parsed.remainder, " -la");
    }

    #[test]
    fn unterminated_and_trailing_quote_text_are_malformed() {
        let profile = PlatformProfile::linux();
        for bad in ["\"/bin/ls -la", "'/bin/ls", "\"/bin/ls\"x", "   "] {
            let err = parse_executable(bad, &profile).unwrap_err();
            assert_eq!(err.code(), "MALFORMED_COMMAND", "{bad:?}");
        }
    }
}
