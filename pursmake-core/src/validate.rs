//! Surface-syntax validation for foreign (JavaScript FFI) files.
//!
//! Not a parser: a string/comment/regex-aware scan that catches the
//! damage truncated or mis-edited FFI files actually show up with —
//! unbalanced brackets and unterminated literals. One bad file never
//! stops the rest from being checked.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

/// One problem found in a file, with a 1-based position.
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxIssue {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// All issues found in one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub issues: Vec<SyntaxIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub failures: Vec<FileReport>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.failures.iter().map(|f| f.issues.len()).sum()
    }
}

/// Check every listed file (paths relative to `root`) in parallel.
/// Unreadable files become per-file failures, not errors.
pub fn validate_files(
    root: &Path,
    files: &[PathBuf],
    jobs: Option<usize>,
) -> Result<ValidationReport> {
    let run = || -> Vec<Option<FileReport>> {
        files
            .par_iter()
            .map(|rel| {
                let path = root.join(rel);
                match fs::read_to_string(&path) {
                    Ok(src) => {
                        let issues = check_source(&src);
                        if issues.is_empty() {
                            None
                        } else {
                            Some(FileReport {
                                path: rel.clone(),
                                issues,
                            })
                        }
                    }
                    Err(err) => Some(FileReport {
                        path: rel.clone(),
                        issues: vec![SyntaxIssue {
                            line: 1,
                            column: 1,
                            message: format!("could not read file: {err}"),
                        }],
                    }),
                }
            })
            .collect()
    };

    let reports = if let Some(jobs) = jobs {
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(run)
    } else {
        run()
    };

    Ok(ValidationReport {
        files_checked: files.len(),
        failures: reports.into_iter().flatten().collect(),
    })
}

/// Scan one source text and return every issue found.
pub fn check_source(src: &str) -> Vec<SyntaxIssue> {
    let mut cur = Cursor::new(src);
    let mut issues = Vec::new();
    let mut stack: Vec<Opener> = Vec::new();
    // Last significant character, for the division/regex heuristic.
    let mut prev: Option<char> = None;

    while let Some(ch) = cur.peek() {
        let (line, column) = cur.pos();
        match ch {
            '/' if cur.peek2() == Some('/') => {
                while let Some(c) = cur.peek() {
                    if c == '\n' {
                        break;
                    }
                    cur.bump();
                }
            }
            '/' if cur.peek2() == Some('*') => {
                cur.bump();
                cur.bump();
                let mut closed = false;
                while let Some(c) = cur.bump() {
                    if c == '*' && cur.peek() == Some('/') {
                        cur.bump();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    issues.push(issue(line, column, "unterminated block comment"));
                }
            }
            '\'' | '"' => {
                cur.bump();
                let mut closed = false;
                while let Some(c) = cur.peek() {
                    if c == '\n' {
                        break;
                    }
                    cur.bump();
                    if c == '\\' {
                        cur.bump();
                    } else if c == ch {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    issues.push(issue(line, column, "unterminated string literal"));
                }
                prev = Some(ch);
            }
            '`' => {
                cur.bump();
                let mut closed = false;
                while let Some(c) = cur.bump() {
                    if c == '\\' {
                        cur.bump();
                    } else if c == '`' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    issues.push(issue(line, column, "unterminated template literal"));
                }
                prev = Some('`');
            }
            '/' if regex_can_follow(prev) => {
                cur.bump();
                let mut in_class = false;
                let mut closed = false;
                while let Some(c) = cur.peek() {
                    if c == '\n' {
                        break;
                    }
                    cur.bump();
                    match c {
                        '\\' => {
                            cur.bump();
                        }
                        '[' => in_class = true,
                        ']' => in_class = false,
                        '/' if !in_class => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    issues.push(issue(line, column, "unterminated regular expression"));
                }
                // A regex is a value; a following `/` is division.
                prev = Some('"');
            }
            '(' | '[' | '{' => {
                cur.bump();
                stack.push(Opener { ch, line, column });
                prev = Some(ch);
            }
            ')' | ']' | '}' => {
                cur.bump();
                match stack.pop() {
                    None => issues.push(issue(
                        line,
                        column,
                        format!("unexpected `{ch}` with no matching opener"),
                    )),
                    Some(open) if closing(open.ch) == ch => {}
                    Some(open) => issues.push(issue(
                        line,
                        column,
                        format!(
                            "mismatched `{ch}`: `{}` opened at {}:{} expects `{}`",
                            open.ch,
                            open.line,
                            open.column,
                            closing(open.ch)
                        ),
                    )),
                }
                prev = Some(ch);
            }
            c => {
                cur.bump();
                if !c.is_whitespace() {
                    prev = Some(c);
                }
            }
        }
    }

    for open in stack {
        issues.push(issue(
            open.line,
            open.column,
            format!("unclosed `{}`", open.ch),
        ));
    }

    issues
}

struct Opener {
    ch: char,
    line: usize,
    column: usize,
}

fn issue(line: usize, column: usize, message: impl Into<String>) -> SyntaxIssue {
    SyntaxIssue {
        line,
        column,
        message: message.into(),
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// After these characters (or at the start of input) a `/` begins a
/// regex literal rather than division. Misses keyword positions like
/// `return /x/`; good enough for FFI shims.
fn regex_can_follow(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => matches!(
            c,
            '(' | '[' | '{' | ',' | ';' | '=' | ':' | '!' | '&' | '|' | '?' | '+' | '-' | '*'
                | '%' | '<' | '>' | '~' | '^'
        ),
    }
}

struct Cursor {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn pos(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}
