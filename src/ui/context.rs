//! Terminal detection for CLI output

use std::io::IsTerminal;

/// Environment variables set by common CI runners
const CI_VARS: [&str; 5] = ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "BUILDKITE", "JENKINS_URL"];

/// Decides between framed `cliclack` output and plain lines
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    framed: bool,
}

impl UiContext {
    /// Framed output on a terminal outside CI, plain otherwise
    pub fn detect() -> Self {
        let framed = std::io::stdout().is_terminal()
            && !CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self { framed }
    }

    /// Always plain output
    pub fn plain() -> Self {
        Self { framed: false }
    }

    pub fn framed(&self) -> bool {
        self.framed
    }
}
