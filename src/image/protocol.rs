//! Inline-image protocol detection and encoding.

use std::env;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::TerminalCapabilities;

/// Terminal programs known to render iTerm2 inline images.
const INLINE_TERM_PROGRAMS: [&str; 3] = ["iTerm.app", "WezTerm", "mintty"];

/// Capability probe reading `TERM_PROGRAM` and `LC_TERMINAL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCapabilities;

impl TerminalCapabilities for EnvCapabilities {
    fn supports_inline_images(&self) -> bool {
        supports_inline_from_env(
            env::var("TERM_PROGRAM").ok().as_deref(),
            env::var("LC_TERMINAL").ok().as_deref(),
        )
    }
}

/// Capability answer fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCapabilities(pub bool);

impl TerminalCapabilities for FixedCapabilities {
    fn supports_inline_images(&self) -> bool {
        self.0
    }
}

fn supports_inline_from_env(term_program: Option<&str>, lc_terminal: Option<&str>) -> bool {
    if term_program.is_some_and(|program| INLINE_TERM_PROGRAMS.contains(&program)) {
        return true;
    }
    lc_terminal == Some("iTerm2")
}

/// Build the iTerm2 `File=inline` escape for raw image bytes.
pub fn inline_escape(bytes: &[u8], width: usize) -> String {
    let encoded = STANDARD.encode(bytes);
    format!("\x1b]1337;File=inline=1;width={width};preserveAspectRatio=1:{encoded}\x07")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_supported_terminals() {
        assert!(supports_inline_from_env(Some("iTerm.app"), None));
        assert!(supports_inline_from_env(Some("WezTerm"), None));
        assert!(supports_inline_from_env(Some("mintty"), None));
        assert!(supports_inline_from_env(None, Some("iTerm2")));
    }

    #[test]
    fn test_inline_unsupported_terminals() {
        assert!(!supports_inline_from_env(None, None));
        assert!(!supports_inline_from_env(Some("Apple_Terminal"), None));
        assert!(!supports_inline_from_env(Some("vscode"), Some("xterm")));
    }

    #[test]
    fn test_fixed_capabilities() {
        assert!(FixedCapabilities(true).supports_inline_images());
        assert!(!FixedCapabilities(false).supports_inline_images());
    }

    #[test]
    fn test_inline_escape_format() {
        let escape = inline_escape(b"abc", 60);
        assert_eq!(
            escape,
            "\x1b]1337;File=inline=1;width=60;preserveAspectRatio=1:YWJj\x07"
        );
    }
}
