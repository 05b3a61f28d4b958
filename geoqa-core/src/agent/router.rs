//! Keyword intent routing.

use geoqa_tools::ToolRegistry;
use std::collections::BTreeMap;
use tracing::debug;

/// Trigger table mapping each tool to the substrings that make it a
/// candidate for a question.
///
/// Built from each tool's default keywords. An entry in `overrides` replaces
/// the defaults of the tool with that name. Triggers are stored trimmed and
/// lowercased and matched against the lowercased question, in registry
/// order. Blank triggers are dropped since they would match every question.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<(String, Vec<String>)>,
}

impl Router {
    pub fn new(registry: &ToolRegistry, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        let routes = registry
            .all()
            .iter()
            .map(|tool| {
                let triggers = match overrides.get(tool.name()) {
                    Some(custom) => normalize(custom.iter().map(String::as_str)),
                    None => normalize(tool.keywords().iter().copied()),
                };
                (tool.name().to_string(), triggers)
            })
            .collect();

        Self { routes }
    }

    /// Names of the tools whose triggers occur in the question.
    pub fn candidates(&self, question: &str) -> Vec<&str> {
        let question = question.to_lowercase();
        let matched: Vec<&str> = self
            .routes
            .iter()
            .filter(|(_, triggers)| triggers.iter().any(|t| question.contains(t.as_str())))
            .map(|(name, _)| name.as_str())
            .collect();

        debug!(candidates = ?matched, "Routed question");
        matched
    }

    pub fn triggers(&self, tool_name: &str) -> Option<&[String]> {
        self.routes
            .iter()
            .find(|(name, _)| name == tool_name)
            .map(|(_, triggers)| triggers.as_slice())
    }
}

fn normalize<'a>(triggers: impl Iterator<Item = &'a str>) -> Vec<String> {
    triggers
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
