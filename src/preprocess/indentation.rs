//! Python-style INDENT/DEDENT transformation with original-line provenance.
//!
//! The scanner below tracks one [`Context`] per level of *explicit* `{ }`
//! nesting already present in the source. Each context owns its own stack of
//! implicit indentation columns, seeded lazily from the first content line
//! that appears inside it (`block_base_indent`). This lets implicit
//! (indentation-driven) and explicit (brace-driven) nesting compose, which is
//! what makes `spec.md`'s P5 (vertical/horizontal equivalence) possible.

use crate::error::IndentError;

/// Maps an output (transformed) line number to the original source line it
/// was derived from. Index 0 corresponds to output line 1.
pub type LineMap = Vec<usize>;

#[derive(Debug, Clone, Copy)]
pub struct PreprocessOptions {
    pub indent_size: usize,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self { indent_size: 2 }
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub transformed_text: String,
    pub line_map: LineMap,
}

#[derive(Debug, Clone)]
struct Context {
    /// Stack of active indentation columns, bottom is always present.
    indent_stack: Vec<i64>,
    /// Indentation column of the first content line seen inside this
    /// explicit block. `None` until that line is processed.
    block_base_indent: Option<i64>,
}

impl Context {
    fn root() -> Self {
        Self {
            indent_stack: vec![0],
            block_base_indent: None,
        }
    }

    fn fresh_nested() -> Self {
        Self {
            indent_stack: vec![0],
            block_base_indent: None,
        }
    }

    fn top(&self) -> i64 {
        *self.indent_stack.last().expect("indent stack never empty")
    }
}

/// Transform `source` into explicit-brace form, returning the transformed
/// text and a line map. See module docs and `spec.md` §4.2 for the algorithm.
pub fn preprocess(source: &str, options: PreprocessOptions) -> Result<Preprocessed, IndentError> {
    let _ = options.indent_size; // Any strictly-increasing column is accepted (Python-compatible).

    let normalized = normalize_newlines(source);
    let lines: Vec<&str> = split_lines(&normalized);

    let mut out_lines: Vec<String> = Vec::with_capacity(lines.len());
    let mut line_map: LineMap = Vec::with_capacity(lines.len());
    let mut contexts: Vec<Context> = vec![Context::root()];
    let mut last_nonblank_line = 1usize;

    for (idx, raw_line) in lines.iter().enumerate() {
        let orig_line = idx + 1;

        if raw_line.trim().is_empty() {
            out_lines.push((*raw_line).to_string());
            line_map.push(orig_line);
            continue;
        }
        last_nonblank_line = orig_line;

        let opens = raw_line.matches('{').count() as i64;
        let closes = raw_line.matches('}').count() as i64;
        let net = opens - closes;
        let has_braces = opens > 0 || closes > 0;
        let prior_depth = contexts.len() - 1;

        if has_braces {
            if prior_depth == 0 {
                process_root_brace_line(
                    raw_line,
                    orig_line,
                    net,
                    &mut contexts,
                    &mut out_lines,
                    &mut line_map,
                )?;
            } else {
                process_nested_brace_line(
                    raw_line,
                    orig_line,
                    net,
                    &mut contexts,
                    &mut out_lines,
                    &mut line_map,
                )?;
            }
        } else {
            if raw_line.contains('\t') {
                return Err(IndentError::TabInIndentation { line: orig_line });
            }
            let indent = leading_spaces(raw_line) as i64;
            if orig_line == 1 && indent > 0 {
                return Err(IndentError::LeadingIndentOnFirstLine {
                    indent: indent as usize,
                });
            }
            let cur = contexts.last_mut().expect("root context always present");
            apply_plain_indentation(
                raw_line,
                orig_line,
                indent,
                cur,
                &mut out_lines,
                &mut line_map,
            )?;
        }
    }

    // EOF: close every implicit level still open, in every still-open context,
    // innermost first, attributing synthetic `}` to the last non-blank line.
    while let Some(cur) = contexts.last_mut() {
        let base = cur.block_base_indent.unwrap_or(0);
        while cur.top() > base {
            cur.indent_stack.pop();
            out_lines.push("}".to_string());
            line_map.push(last_nonblank_line);
        }
        if contexts.len() == 1 {
            break;
        }
        contexts.pop();
    }

    Ok(Preprocessed {
        transformed_text: out_lines.join("\n"),
        line_map,
    })
}

fn process_root_brace_line(
    raw_line: &str,
    orig_line: usize,
    net: i64,
    contexts: &mut Vec<Context>,
    out_lines: &mut Vec<String>,
    line_map: &mut LineMap,
) -> Result<(), IndentError> {
    let indent = leading_spaces(raw_line) as i64;
    let cur = &mut contexts[0];

    if indent > cur.top() {
        cur.indent_stack.push(indent);
        out_lines.push(format!("{{{}", raw_line));
        line_map.push(orig_line);
    } else if indent < cur.top() {
        let valid_columns = cur.indent_stack.iter().map(|&c| c as usize).collect();
        while cur.indent_stack.len() > 1 && cur.top() > indent {
            cur.indent_stack.pop();
            out_lines.push("}".to_string());
            line_map.push(orig_line);
        }
        if cur.top() != indent {
            return Err(IndentError::InvalidDedent {
                line: orig_line,
                column: indent as usize,
                valid_columns,
            });
        }
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
    } else {
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
    }

    if net > 0 {
        contexts.push(Context::fresh_nested());
    }
    Ok(())
}

fn process_nested_brace_line(
    raw_line: &str,
    orig_line: usize,
    net: i64,
    contexts: &mut Vec<Context>,
    out_lines: &mut Vec<String>,
    line_map: &mut LineMap,
) -> Result<(), IndentError> {
    let indent = leading_spaces(raw_line) as i64;
    let is_first_in_block = contexts.last().unwrap().block_base_indent.is_none();

    if is_first_in_block {
        {
            let cur = contexts.last_mut().unwrap();
            cur.block_base_indent = Some(indent);
            cur.indent_stack = vec![indent];
        }
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
        if net > 0 {
            contexts.push(Context::fresh_nested());
        } else if net < 0 {
            contexts.pop();
        }
        return Ok(());
    }

    if net < 0 {
        let cur = contexts.last_mut().unwrap();
        let base = cur.block_base_indent.unwrap_or(0);
        while cur.top() > base {
            cur.indent_stack.pop();
            out_lines.push("}".to_string());
            line_map.push(orig_line);
        }
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
        contexts.pop();
    } else if net > 0 {
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
        contexts.push(Context::fresh_nested());
    } else {
        let cur = contexts.last_mut().unwrap();
        apply_plain_indentation(raw_line, orig_line, indent, cur, out_lines, line_map)?;
    }
    Ok(())
}

fn apply_plain_indentation(
    raw_line: &str,
    orig_line: usize,
    indent: i64,
    cur: &mut Context,
    out_lines: &mut Vec<String>,
    line_map: &mut LineMap,
) -> Result<(), IndentError> {
    if indent > cur.top() {
        cur.indent_stack.push(indent);
        out_lines.push(format!("{{{}", raw_line));
        line_map.push(orig_line);
    } else if indent < cur.top() {
        let valid_columns = cur.indent_stack.iter().map(|&c| c as usize).collect();
        while cur.indent_stack.len() > 1 && cur.top() > indent {
            cur.indent_stack.pop();
            out_lines.push("}".to_string());
            line_map.push(orig_line);
        }
        if cur.top() != indent {
            return Err(IndentError::InvalidDedent {
                line: orig_line,
                column: indent as usize,
                valid_columns,
            });
        }
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
    } else {
        out_lines.push(raw_line.to_string());
        line_map.push(orig_line);
    }
    Ok(())
}

fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

fn split_lines(source: &str) -> Vec<&str> {
    if source.is_empty() {
        return Vec::new();
    }
    source.split('\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Preprocessed {
        preprocess(src, PreprocessOptions::default()).expect("preprocess should succeed")
    }

    #[test]
    fn flat_source_is_unchanged() {
        let p = run("A -> B");
        assert_eq!(p.transformed_text, "A -> B");
        assert_eq!(p.line_map, vec![1]);
    }

    #[test]
    fn simple_indent_wraps_block() {
        let p = run("? q\n  || a\n  || b");
        assert_eq!(p.transformed_text, "? q\n{  || a\n  || b\n}");
        assert_eq!(p.line_map, vec![1, 2, 3, 3]);
    }

    #[test]
    fn dedent_to_unknown_column_fails() {
        let src = "A\n  B\n C";
        let err = preprocess(src, PreprocessOptions::default()).unwrap_err();
        assert!(matches!(err, IndentError::InvalidDedent { line: 3, .. }));
    }

    #[test]
    fn tab_in_indentation_fails() {
        let src = "A\n\tB";
        let err = preprocess(src, PreprocessOptions::default()).unwrap_err();
        assert_eq!(err, IndentError::TabInIndentation { line: 2 });
    }

    #[test]
    fn leading_indent_on_first_line_fails() {
        let src = "  A";
        let err = preprocess(src, PreprocessOptions::default()).unwrap_err();
        assert_eq!(err, IndentError::LeadingIndentOnFirstLine { indent: 2 });
    }

    #[test]
    fn explicit_block_is_left_alone() {
        let p = run("? q\n{|| a; || b}");
        assert_eq!(p.transformed_text, "? q\n{|| a; || b}");
        assert_eq!(p.line_map, vec![1, 2]);
    }

    #[test]
    fn empty_source_yields_empty_output() {
        let p = run("");
        assert_eq!(p.transformed_text, "");
        assert!(p.line_map.is_empty());
    }
}
