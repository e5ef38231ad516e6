use std::path::{Path, PathBuf};

const DEFAULT_ESCAPE: char = '\\';

/// One Dockerfile instruction after continuation lines are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Keyword, lowercased (`expose`, `run`, ...)
    pub command: String,
    /// Leading `--flag[=value]` tokens, verbatim
    pub flags: Vec<String>,
    pub values: Vec<String>,
    /// Exec form (`["a", "b"]`)
    pub json: bool,
    pub original: String,
    /// 1-based, inclusive
    pub start_line: usize,
    pub end_line: usize,
}

/// A parsed Dockerfile: the escape character in effect and the ordered
/// instruction list.
///
/// # Examples
///
/// ```
/// use kedge_build::Dockerfile;
///
/// let df = Dockerfile::parse("FROM nginx\nEXPOSE 80 443\n").unwrap();
/// assert_eq!(df.instructions.len(), 2);
/// assert_eq!(df.exposed_ports(), Some(&["80".to_owned(), "443".to_owned()][..]));
/// ```
#[derive(Debug, Clone)]
pub struct Dockerfile {
    pub escape: char,
    pub instructions: Vec<Instruction>,
}

impl Dockerfile {
    /// Read and parse the Dockerfile at `path`.
    pub fn from_path(path: &Path) -> Result<Self, DockerfileError> {
        let content = std::fs::read_to_string(path).map_err(|e| DockerfileError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parsed = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            instructions = parsed.instructions.len(),
            "parsed Dockerfile"
        );
        Ok(parsed)
    }

    /// Parse Dockerfile source text.
    ///
    /// # Errors
    ///
    /// - [`DockerfileError::InvalidEscape`] if an `escape` directive names
    ///   anything other than `\` or `` ` ``
    /// - [`DockerfileError::NoInstructions`] if only comments and blank
    ///   lines are present
    pub fn parse(content: &str) -> Result<Self, DockerfileError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut escape = DEFAULT_ESCAPE;
        let mut in_directives = true;
        let mut instructions = Vec::new();
        let mut pending: Option<Pending> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            // Directives are only honored before any comment, blank line or instruction
            if in_directives {
                if let Some((key, value)) = parse_directive(trimmed) {
                    if key == "escape" {
                        escape = parse_escape(value)?;
                    }
                    continue;
                }
                in_directives = false;
            }

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            // Continuation lines keep their indentation
            let line = if pending.is_some() {
                raw.trim_end()
            } else {
                trimmed
            };
            let (body, continues) = match line.strip_suffix(escape) {
                Some(body) => (body, true),
                None => (line, false),
            };

            match pending.as_mut() {
                Some(p) => {
                    p.text.push_str(body);
                    p.end = line_no;
                }
                None => {
                    pending = Some(Pending {
                        text: body.to_owned(),
                        start: line_no,
                        end: line_no,
                    });
                }
            }

            if !continues {
                if let Some(instruction) = pending.take().and_then(|p| p.finish(escape)) {
                    instructions.push(instruction);
                }
            }
        }

        // Trailing continuation at EOF
        if let Some(instruction) = pending.take().and_then(|p| p.finish(escape)) {
            instructions.push(instruction);
        }

        if instructions.is_empty() {
            return Err(DockerfileError::NoInstructions);
        }

        Ok(Self {
            escape,
            instructions,
        })
    }

    /// Ports declared by the last `EXPOSE` instruction, if any.
    ///
    /// Earlier `EXPOSE` instructions are ignored.
    pub fn exposed_ports(&self) -> Option<&[String]> {
        self.instructions_named("expose")
            .last()
            .map(|i| i.values.as_slice())
    }

    /// Instructions whose lowercased keyword equals `command`.
    pub fn instructions_named<'a>(
        &'a self,
        command: &'a str,
    ) -> impl Iterator<Item = &'a Instruction> + 'a {
        self.instructions
            .iter()
            .filter(move |i| i.command == command)
    }
}

struct Pending {
    text: String,
    start: usize,
    end: usize,
}

impl Pending {
    fn finish(self, escape: char) -> Option<Instruction> {
        let text = self.text.trim();
        let (keyword, rest) = match text.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim_start()),
            None => (text, ""),
        };
        if keyword.is_empty() {
            return None;
        }

        let command = keyword.to_ascii_lowercase();
        let (flags, rest) = split_flags(rest);
        let (values, json) = parse_values(&command, rest, escape);

        Some(Instruction {
            command,
            flags,
            values,
            json,
            original: text.to_owned(),
            start_line: self.start,
            end_line: self.end,
        })
    }
}

/// `# key=value` with a single-word key, lowercased.
fn parse_directive(line: &str) -> Option<(String, &str)> {
    let body = line.strip_prefix('#')?;
    let (key, value) = body.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || key.contains(char::is_whitespace) || value.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), value))
}

fn parse_escape(value: &str) -> Result<char, DockerfileError> {
    match value {
        "\\" => Ok('\\'),
        "`" => Ok('`'),
        other => Err(DockerfileError::InvalidEscape(other.to_owned())),
    }
}

fn split_flags(mut rest: &str) -> (Vec<String>, &str) {
    let mut flags = Vec::new();
    loop {
        let trimmed = rest.trim_start();
        if !trimmed.starts_with("--") {
            return (flags, trimmed);
        }
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        flags.push(trimmed[..end].to_owned());
        rest = &trimmed[end..];
    }
}

fn parse_values(command: &str, rest: &str, escape: char) -> (Vec<String>, bool) {
    match command {
        "run" | "cmd" | "entrypoint" | "shell" | "volume" => {
            if let Some(list) = parse_json_array(rest) {
                return (list, true);
            }
            if command == "volume" {
                (split_whitespace(rest), false)
            } else {
                (single(rest), false)
            }
        }
        "env" | "label" => (parse_key_values(rest, escape), false),
        "maintainer" | "healthcheck" | "onbuild" => (single(rest), false),
        _ => (split_whitespace(rest), false),
    }
}

fn parse_json_array(rest: &str) -> Option<Vec<String>> {
    if !rest.starts_with('[') {
        return None;
    }
    // arch-lint: allow(no-silent-result-drop) reason="non-JSON arguments fall back to shell form"
    serde_json::from_str(rest).ok()
}

fn single(rest: &str) -> Vec<String> {
    if rest.is_empty() {
        Vec::new()
    } else {
        vec![rest.to_owned()]
    }
}

fn split_whitespace(rest: &str) -> Vec<String> {
    rest.split_whitespace().map(str::to_owned).collect()
}

/// `k1=v1 k2="v 2"` or legacy `KEY some value`, flattened to `[k, v, ...]`.
fn parse_key_values(rest: &str, escape: char) -> Vec<String> {
    let words = split_words(rest, escape);
    let Some(first) = words.first() else {
        return Vec::new();
    };

    if !first.contains('=') {
        return match rest.split_once(char::is_whitespace) {
            Some((key, value)) => vec![key.to_owned(), value.trim().to_owned()],
            None => vec![rest.to_owned(), String::new()],
        };
    }

    words
        .iter()
        .flat_map(|word| match word.split_once('=') {
            Some((key, value)) => [unquote(key, escape), unquote(value, escape)],
            None => [unquote(word, escape), String::new()],
        })
        .collect()
}

/// Split on whitespace outside quotes, keeping the raw word text.
fn split_words(s: &str, escape: char) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == escape && quote != Some('\'') {
            escaped = true;
            start.get_or_insert(i);
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                start.get_or_insert(i);
            }
            None if c.is_whitespace() => {
                if let Some(begin) = start.take() {
                    words.push(&s[begin..i]);
                }
            }
            None => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(begin) = start {
        words.push(&s[begin..]);
    }
    words
}

fn unquote(word: &str, escape: char) -> String {
    let mut out = String::with_capacity(word.len());
    let mut quote: Option<char> = None;
    let mut chars = word.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') if c == '\'' => quote = None,
            Some('\'') => out.push(c),
            _ if c == escape => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            Some(q) if c == q => quote = None,
            Some(_) => out.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None => out.push(c),
        }
    }
    out
}

#[derive(Debug, thiserror::Error)]
pub enum DockerfileError {
    #[error("failed to read Dockerfile at {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file with no instructions")]
    NoInstructions,
    #[error("invalid escape token {0:?}: must be ` or \\")]
    InvalidEscape(String),
}
