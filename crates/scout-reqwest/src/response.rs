//! SerpAPI response payload and its plain-text rendering.

use serde::Deserialize;

/// Subset of the SerpAPI search response used by scout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Direct answer box, when the engine produced one.
    #[serde(default)]
    pub answer_box: Option<AnswerBox>,
    /// Ranked organic results.
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    /// Error reported by the API.
    #[serde(default)]
    pub error: Option<String>,
}

/// SerpAPI answer box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerBox {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One organic search result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl AnswerBox {
    fn text(&self) -> Option<&str> {
        [&self.answer, &self.snippet, &self.title]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

impl OrganicResult {
    fn render(&self) -> Option<String> {
        let title = self.title.trim();
        let snippet = self.snippet.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() && snippet.is_empty() {
            return None;
        }

        let mut line = match (title.is_empty(), snippet.is_empty()) {
            (false, false) => format!("{title}: {snippet}"),
            (false, true) => title.to_owned(),
            _ => snippet.to_owned(),
        };
        let link = self.link.trim();
        if !link.is_empty() {
            line.push_str(&format!(" ({link})"));
        }
        Some(line)
    }
}

impl SearchResponse {
    /// Renders the answer box and up to `max_results` organic results.
    ///
    /// Returns an empty string when the response carries nothing usable.
    pub fn render(&self, max_results: usize) -> String {
        let answer = self.answer_box.as_ref().and_then(AnswerBox::text);
        let results = self
            .organic_results
            .iter()
            .filter_map(OrganicResult::render)
            .take(max_results);

        answer
            .map(str::to_owned)
            .into_iter()
            .chain(results)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn renders_answer_box_before_results() {
        let response = parse(
            r#"{
                "answer_box": {"answer": "Median notice period is 30 days."},
                "organic_results": [
                    {"title": "Notice periods 2024", "link": "https://example.com/a", "snippet": "Most firms use 30 days."},
                    {"title": "Tech hiring report", "link": "https://example.com/b"},
                    {"title": "Ignored", "link": "https://example.com/c", "snippet": "over the limit"}
                ]
            }"#,
        );

        assert_eq!(
            response.render(2),
            "Median notice period is 30 days.\n\
             Notice periods 2024: Most firms use 30 days. (https://example.com/a)\n\
             Tech hiring report (https://example.com/b)"
        );
    }

    #[test]
    fn falls_back_to_answer_box_snippet() {
        let response = parse(r#"{"answer_box": {"answer": " ", "snippet": "Snippet answer"}}"#);
        assert_eq!(response.render(5), "Snippet answer");
    }

    #[test]
    fn empty_response_renders_nothing() {
        assert_eq!(parse("{}").render(5), "");
        assert_eq!(
            parse(r#"{"organic_results": [{"title": " ", "link": "https://x"}]}"#).render(5),
            ""
        );
    }
}
