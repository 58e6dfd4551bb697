//! Code node highlighting dispatch.
//!
//! Finds every `<pre>` in canonical markup, decides which language its code
//! should be highlighted as, and tags the node for the renderer. Text content
//! is never touched, so running it twice gives the same result.

use answerkit_core::CodeLanguage;
use serde::Serialize;

use crate::ir::{Element, Fragment, MarkupNode};

/// Marker class the renderer's highlighter keys its theme on.
pub const HIGHLIGHT_CLASS: &str = "hljs";

/// Set on code nodes whose language came from the default, so a later
/// dispatch over the output still reports them as not explicit.
pub const DEFAULTED_ATTR: &str = "data-language-defaulted";

/// One code node scheduled for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTarget {
    pub language: String,
    /// False when the language came from the default.
    pub explicit: bool,
    pub code: String,
}

impl CodeTarget {
    /// Display label for the language; tags outside the known set are upper-cased.
    pub fn label(&self) -> String {
        match self.language.parse::<CodeLanguage>() {
            Ok(lang) => lang.label().to_string(),
            Err(_) => self.language.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedMarkup {
    pub html: String,
    pub targets: Vec<CodeTarget>,
}

#[derive(Debug, Clone)]
pub struct HighlightDispatcher {
    default_language: String,
}

impl Default for HighlightDispatcher {
    fn default() -> Self {
        Self::new(CodeLanguage::default())
    }
}

impl HighlightDispatcher {
    pub fn new(default_language: CodeLanguage) -> Self {
        Self {
            default_language: default_language.tag().to_string(),
        }
    }

    /// Picks the language for a code node from an explicit tag or the default.
    pub fn resolve(&self, explicit: Option<&str>) -> (String, bool) {
        match explicit {
            Some(tag) if !tag.is_empty() => (tag.to_string(), true),
            _ => (self.default_language.clone(), false),
        }
    }

    pub fn dispatch(&self, canonical: &str) -> HighlightedMarkup {
        let mut fragment = Fragment::parse(canonical);
        let targets = self.dispatch_fragment(&mut fragment);
        HighlightedMarkup {
            html: fragment.to_html(),
            targets,
        }
    }

    pub fn dispatch_fragment(&self, fragment: &mut Fragment) -> Vec<CodeTarget> {
        let mut targets = Vec::new();
        for node in &mut fragment.nodes {
            self.visit(node, &mut targets);
        }
        targets
    }

    fn visit(&self, node: &mut MarkupNode, targets: &mut Vec<CodeTarget>) {
        let MarkupNode::Element(el) = node else { return };
        if el.is("pre") {
            targets.push(self.mark(el));
            return;
        }
        for child in &mut el.children {
            self.visit(child, targets);
        }
    }

    fn mark(&self, pre: &mut Element) -> CodeTarget {
        let pre_tag = pre.language_tag().map(str::to_string);
        if let Some(code) = pre.child_element_mut("code") {
            return self.mark_target(code, pre_tag);
        }
        self.mark_target(pre, pre_tag)
    }

    /// Tags `target` with its resolved language; `inherited` comes from an enclosing `<pre>`.
    fn mark_target(&self, target: &mut Element, inherited: Option<String>) -> CodeTarget {
        let tag = if target.attr(DEFAULTED_ATTR).is_some() {
            None
        } else {
            target.language_tag().map(str::to_string).or(inherited)
        };
        let (language, explicit) = self.resolve(tag.as_deref());
        target.set_attr("class", format!("language-{language} {HIGHLIGHT_CLASS}"));
        if !explicit {
            target.set_attr(DEFAULTED_ATTR, "true");
        }
        CodeTarget {
            language,
            explicit,
            code: target.text_content(),
        }
    }
}

/// Collects every code target without modifying the markup.
pub fn extract_code(fragment: &Fragment) -> Vec<CodeTarget> {
    let mut copy = fragment.clone();
    HighlightDispatcher::default().dispatch_fragment(&mut copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_explicit_language() {
        let out = HighlightDispatcher::default()
            .dispatch("<pre><code class=\"language-python\">print(1)</code></pre>");
        assert_eq!(
            out.html,
            "<pre><code class=\"language-python hljs\">print(1)</code></pre>"
        );
        assert_eq!(
            out.targets,
            vec![CodeTarget {
                language: "python".into(),
                explicit: true,
                code: "print(1)".into(),
            }]
        );
    }

    #[test]
    fn falls_back_to_default_language() {
        let out = HighlightDispatcher::default().dispatch("<pre><code>int x;</code></pre>");
        assert_eq!(out.targets[0].language, "java");
        assert!(!out.targets[0].explicit);

        let out = HighlightDispatcher::new(CodeLanguage::Sql).dispatch("<pre>SELECT 1</pre>");
        assert_eq!(
            out.html,
            "<pre class=\"language-sql hljs\" data-language-defaulted=\"true\">SELECT 1</pre>"
        );
    }

    #[test]
    fn defaulted_language_stays_defaulted_on_redispatch() {
        let dispatcher = HighlightDispatcher::default();
        let once = dispatcher.dispatch("<pre><code>int x;</code></pre>");
        let twice = dispatcher.dispatch(&once.html);
        assert!(!twice.targets[0].explicit);
        assert_eq!(twice.targets[0].language, "java");
        assert_eq!(once, twice);
    }

    #[test]
    fn finds_nested_code_blocks() {
        let out = HighlightDispatcher::default()
            .dispatch("<blockquote><pre><code>a</code></pre></blockquote><ul><li><pre><code class=\"language-bash\">ls</code></pre></li></ul>");
        let langs: Vec<_> = out.targets.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(langs, vec!["java", "bash"]);
    }

    #[test]
    fn is_idempotent_and_preserves_text() {
        let dispatcher = HighlightDispatcher::default();
        let input = "<p>x</p><pre><code class=\"language-json\">{\"a\": 1}\n</code></pre>";
        let once = dispatcher.dispatch(input);
        let twice = dispatcher.dispatch(&once.html);
        assert_eq!(once, twice);
        assert_eq!(once.targets[0].code, "{\"a\": 1}\n");
    }

    #[test]
    fn extract_leaves_fragment_alone() {
        let fragment = Fragment::parse("<pre><code>a</code></pre>");
        let targets = extract_code(&fragment);
        assert_eq!(targets.len(), 1);
        assert_eq!(fragment.to_html(), "<pre><code>a</code></pre>");
    }

    #[test]
    fn labels_known_and_unknown_languages() {
        let target = |language: &str| CodeTarget {
            language: language.into(),
            explicit: true,
            code: String::new(),
        };
        assert_eq!(target("javascript").label(), "JavaScript");
        assert_eq!(target("go").label(), "GO");
    }
}
