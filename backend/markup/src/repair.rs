//! Code-line paragraph repair.
//!
//! Source code pasted into the WYSIWYG surface sometimes comes back as one
//! `<p><code>line</code></p>` per line. The repairer scans the top-level
//! siblings once, merges every run of such paragraphs into a single
//! `<pre><code class="language-…">` block, and splices the result in one go.
//!
//! Quill's own code-line containers (`div.ql-code-block-container`) are folded
//! into the same canonical shape.

use answerkit_core::CodeLanguage;
use serde::Serialize;
use tracing::debug;

use crate::ir::{Element, Fragment, MarkupNode, normalize_language_tag};

const QUILL_CONTAINER_CLASS: &str = "ql-code-block-container";
const QUILL_LINE_CLASS: &str = "ql-code-block";

/// What one repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub runs_merged: usize,
    pub lines_merged: usize,
    pub containers_normalized: usize,
}

impl RepairReport {
    pub fn changed(&self) -> bool {
        self.runs_merged > 0 || self.containers_normalized > 0
    }
}

/// An open run of code-line paragraphs.
#[derive(Debug)]
struct Run {
    lines: Vec<String>,
    /// Blank text seen since the last line; absorbed if the run continues.
    held: Vec<MarkupNode>,
}

#[derive(Debug)]
enum ScanState {
    Scanning,
    InRun(Run),
}

#[derive(Debug, Clone)]
pub struct ContentRepairer {
    default_language: String,
}

impl Default for ContentRepairer {
    fn default() -> Self {
        Self::new(CodeLanguage::default())
    }
}

/// Repair with the default language tag.
pub fn repair(input: &str) -> String {
    ContentRepairer::default().repair(input)
}

pub fn repair_with_report(input: &str) -> (String, RepairReport) {
    ContentRepairer::default().repair_with_report(input)
}

impl ContentRepairer {
    pub fn new(default_language: CodeLanguage) -> Self {
        Self {
            default_language: default_language.tag().to_string(),
        }
    }

    pub fn repair(&self, input: &str) -> String {
        self.repair_with_report(input).0
    }

    pub fn repair_with_report(&self, input: &str) -> (String, RepairReport) {
        let (fragment, report) = self.repair_fragment(Fragment::parse(input));
        if report.changed() {
            debug!(
                runs = report.runs_merged,
                lines = report.lines_merged,
                containers = report.containers_normalized,
                "Repaired degraded code markup"
            );
        }
        (fragment.to_html(), report)
    }

    pub fn repair_fragment(&self, fragment: Fragment) -> (Fragment, RepairReport) {
        let mut report = RepairReport::default();
        let mut out = Vec::with_capacity(fragment.nodes.len());
        let mut state = ScanState::Scanning;

        for node in fragment.nodes {
            state = match state {
                ScanState::InRun(mut run) => match code_line_text(&node) {
                    Some(line) => {
                        run.held.clear();
                        run.lines.push(line);
                        ScanState::InRun(run)
                    }
                    None if node.is_blank_text() => {
                        run.held.push(node);
                        ScanState::InRun(run)
                    }
                    None => {
                        self.close_run(run, &mut out, &mut report);
                        self.scan(node, &mut out, &mut report)
                    }
                },
                ScanState::Scanning => self.scan(node, &mut out, &mut report),
            };
        }
        if let ScanState::InRun(run) = state {
            self.close_run(run, &mut out, &mut report);
        }

        (Fragment::new(out), report)
    }

    fn scan(
        &self,
        node: MarkupNode,
        out: &mut Vec<MarkupNode>,
        report: &mut RepairReport,
    ) -> ScanState {
        if let Some(line) = code_line_text(&node) {
            return ScanState::InRun(Run {
                lines: vec![line],
                held: Vec::new(),
            });
        }
        match self.normalize_container(&node) {
            Some(block) => {
                report.containers_normalized += 1;
                out.push(block);
            }
            None => out.push(node),
        }
        ScanState::Scanning
    }

    fn close_run(&self, run: Run, out: &mut Vec<MarkupNode>, report: &mut RepairReport) {
        report.runs_merged += 1;
        report.lines_merged += run.lines.len();
        out.push(code_block(&self.default_language, &run.lines.join("\n")));
        out.extend(run.held);
    }

    fn normalize_container(&self, node: &MarkupNode) -> Option<MarkupNode> {
        let container = node.as_element()?;
        if !container.is("div") || !container.has_class(QUILL_CONTAINER_CLASS) {
            return None;
        }

        let lines: Vec<&Element> = container
            .children
            .iter()
            .filter_map(MarkupNode::as_element)
            .filter(|el| el.has_class(QUILL_LINE_CLASS))
            .collect();
        if lines.is_empty() {
            return None;
        }

        let language = lines
            .iter()
            .filter_map(|line| line.attr("data-language"))
            .filter(|lang| *lang != "plain")
            .filter_map(normalize_language_tag)
            .last()
            .unwrap_or_else(|| self.default_language.clone());

        let text = lines
            .iter()
            .map(|line| {
                let text = line.text_content();
                if text.trim().is_empty() { String::new() } else { text }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Some(code_block(&language, &text))
    }
}

/// The text of a paragraph whose only child is an inline code element.
fn code_line_text(node: &MarkupNode) -> Option<String> {
    let para = node.as_element()?;
    if !para.is("p") {
        return None;
    }
    match para.children.as_slice() {
        [MarkupNode::Element(code)] if code.is("code") => Some(code.text_content()),
        _ => None,
    }
}

fn code_block(language: &str, text: &str) -> MarkupNode {
    let code = Element::new("code")
        .with_attr("class", format!("language-{language}"))
        .with_text(text);
    Element::new("pre").with_child(code).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_consecutive_code_lines() {
        let input = "<p><code>int a;</code></p><p><code>a = 1;</code></p><p><code>return a;</code></p>";
        let (out, report) = repair_with_report(input);
        assert_eq!(
            out,
            "<pre><code class=\"language-java\">int a;\na = 1;\nreturn a;</code></pre>"
        );
        assert_eq!(report.runs_merged, 1);
        assert_eq!(report.lines_merged, 3);

        let fragment = Fragment::parse(&out);
        let pre = fragment.nodes[0].as_element().unwrap();
        assert_eq!(pre.text_content(), "int a;\na = 1;\nreturn a;");
    }

    #[test]
    fn keeps_surrounding_content_in_place() {
        let input = "<p>Intro</p><p><code>x++;</code></p><p><code>y--;</code></p><p>Outro</p>";
        let out = repair(input);
        assert_eq!(
            out,
            "<p>Intro</p><pre><code class=\"language-java\">x++;\ny--;</code></pre><p>Outro</p>"
        );
    }

    #[test]
    fn separate_runs_become_separate_blocks() {
        let input = "<p><code>a</code></p><p>break</p><p><code>b</code></p>";
        let (out, report) = repair_with_report(input);
        assert_eq!(report.runs_merged, 2);
        assert_eq!(
            out,
            "<pre><code class=\"language-java\">a</code></pre><p>break</p><pre><code class=\"language-java\">b</code></pre>"
        );
    }

    #[test]
    fn lone_code_line_is_still_converted() {
        let out = repair("<p><code>SELECT 1;</code></p>");
        assert_eq!(out, "<pre><code class=\"language-java\">SELECT 1;</code></pre>");
    }

    #[test]
    fn mixed_paragraphs_are_untouched() {
        let input = "<p>Use <code>HashMap</code> here</p><ul><li><p><code>nested</code></p></li></ul>";
        let (out, report) = repair_with_report(input);
        assert_eq!(out, input);
        assert!(!report.changed());
    }

    #[test]
    fn blank_text_between_lines_is_absorbed() {
        let input = "<p><code>a</code></p>\n<p><code>b</code></p>\n<p>after</p>";
        let out = repair(input);
        assert_eq!(
            out,
            "<pre><code class=\"language-java\">a\nb</code></pre>\n<p>after</p>"
        );
    }

    #[test]
    fn uses_configured_default_language() {
        let repairer = ContentRepairer::new(CodeLanguage::Python);
        let out = repairer.repair("<p><code>print(1)</code></p>");
        assert_eq!(out, "<pre><code class=\"language-python\">print(1)</code></pre>");
    }

    #[test]
    fn normalizes_quill_containers() {
        let input = concat!(
            "<div class=\"ql-code-block-container\" spellcheck=\"false\">",
            "<div class=\"ql-code-block\" data-language=\"plain\">def f():</div>",
            "<div class=\"ql-code-block\" data-language=\"python\"><br></div>",
            "<div class=\"ql-code-block\" data-language=\"python\">    return 1</div>",
            "</div>"
        );
        let (out, report) = repair_with_report(input);
        assert_eq!(report.containers_normalized, 1);
        assert_eq!(
            out,
            "<pre><code class=\"language-python\">def f():\n\n    return 1</code></pre>"
        );
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "<p><code>int a;</code></p><p><code>a = 1;</code></p>",
            "<p>text <code>mixed</code></p><p><code>solo</code></p>",
            "<div class=\"ql-code-block-container\"><div class=\"ql-code-block\">x</div></div>",
            "<p>nothing to do</p>",
        ];
        for input in inputs {
            let once = repair(input);
            assert_eq!(repair(&once), once, "input: {input}");
        }
    }

    #[test]
    fn keeps_template_markup() {
        let html = "<template><p>x</p></template>";
        assert_eq!(repair(html), html);
    }

    #[test]
    fn survives_deep_nesting() {
        let depth = 20_000;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let once = repair(&html);
        assert!(once.ends_with("x</div></div>"));
        assert_eq!(repair(&once), once);
    }
}
