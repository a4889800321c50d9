//! Static path rule table
//!
//! Rules are matched by exact path, top to bottom. A rewrite replaces the
//! current path and matching continues with the rules after it.

/// Action taken when a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// 302 to `https://{base_fqdn}`
    RedirectToDefault,
    /// Synthesized liveness body, no asset lookup
    Health,
    /// Serve another public path instead
    Rewrite(&'static str),
    /// 301 to an absolute external URL
    PermanentRedirect(&'static str),
}

/// Exact-match rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRule {
    pub path: &'static str,
    pub action: RuleAction,
}

impl PathRule {
    const fn new(path: &'static str, action: RuleAction) -> Self {
        Self { path, action }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.path == path
    }
}

/// Rules in priority order
pub const PATH_RULES: &[PathRule] = &[
    PathRule::new("/", RuleAction::RedirectToDefault),
    PathRule::new("/health", RuleAction::Health),
    // Legacy /coolify/ namespace
    PathRule::new(
        "/coolify/versions.json",
        RuleAction::Rewrite("/versions.json"),
    ),
    PathRule::new("/coolify/upgrade.sh", RuleAction::Rewrite("/upgrade.sh")),
    PathRule::new(
        "/coolify/install.sh",
        RuleAction::PermanentRedirect("https://cdn.coolify.io/install.sh"),
    ),
];
