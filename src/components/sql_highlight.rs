//! SQL syntax highlighting for the console editor

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// SQLite keywords that should be highlighted
const SQL_KEYWORDS: &[&str] = &[
    "ABORT", "ALL", "ALTER", "AND", "AS", "ASC", "AUTOINCREMENT", "BEGIN", "BETWEEN", "BY",
    "CASE", "CAST", "CHECK", "COLLATE", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "ESCAPE", "EXCEPT",
    "EXISTS", "FOREIGN", "FROM", "FULL", "GLOB", "GROUP", "HAVING", "IF", "IGNORE", "IN",
    "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE",
    "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRAGMA", "PRIMARY",
    "REFERENCES", "REPLACE", "RETURNING", "ROLLBACK", "SELECT", "SET", "TABLE", "THEN",
    "TRANSACTION", "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "WHEN",
    "WHERE", "WITH", "WITHOUT",
];

/// Built-in functions and column types
const SQL_BUILTINS: &[&str] = &[
    "AVG", "BLOB", "COALESCE", "COUNT", "DATE", "DATETIME", "GROUP_CONCAT", "IFNULL",
    "INTEGER", "JSON", "LENGTH", "LOWER", "MAX", "MIN", "NUMERIC", "REAL", "ROUND", "SUBSTR",
    "SUM", "TEXT", "TRIM", "TYPEOF", "UPPER",
];

#[derive(Debug, PartialEq, Clone, Copy)]
enum TokenKind {
    Keyword,
    Builtin,
    String,
    QuotedIdent,
    Number,
    Comment,
    Placeholder,
    Identifier,
    Whitespace,
    Punctuation,
}

#[derive(Debug, PartialEq, Clone)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
}

/// Byte length of a quoted run starting at `start` (quote included); doubled
/// quotes stay inside the run
fn quoted_len(sql: &str, start: usize, quote: char) -> usize {
    let mut iter = sql[start..].char_indices().skip(1).peekable();
    while let Some((offset, ch)) = iter.next() {
        if ch == quote {
            if iter.peek().map(|&(_, next)| next) == Some(quote) {
                iter.next();
                continue;
            }
            return offset + ch.len_utf8();
        }
    }
    sql.len() - start
}

fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < sql.len() {
        let rest = &sql[pos..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        let (kind, len) = match ch {
            '\'' => (TokenKind::String, quoted_len(sql, pos, '\'')),
            '"' | '`' => (TokenKind::QuotedIdent, quoted_len(sql, pos, ch)),
            'x' | 'X' if rest[1..].starts_with('\'') => {
                (TokenKind::String, 1 + quoted_len(sql, pos + 1, '\''))
            }
            '-' if rest.starts_with("--") => {
                let len = rest.find('\n').unwrap_or(rest.len());
                (TokenKind::Comment, len)
            }
            '/' if rest.starts_with("/*") => {
                let len = rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
                (TokenKind::Comment, len)
            }
            '{' => match rest.find('}') {
                Some(end)
                    if rest[1..end]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
                {
                    (TokenKind::Placeholder, end + 1)
                }
                _ => (TokenKind::Punctuation, 1),
            },
            c if c.is_whitespace() => {
                let len = rest
                    .find(|c: char| !c.is_whitespace())
                    .unwrap_or(rest.len());
                (TokenKind::Whitespace, len)
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' || c == '@' || c == '?' => {
                let first = c.len_utf8();
                let len = rest[first..]
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
                    .map_or(rest.len(), |i| i + first);
                (classify_word(&rest[..len]), len)
            }
            c => (TokenKind::Punctuation, c.len_utf8()),
        };

        let len = len.max(ch.len_utf8());
        tokens.push(Token {
            kind,
            text: &rest[..len],
        });
        pos += len;
    }

    tokens
}

fn classify_word(word: &str) -> TokenKind {
    let upper = word.to_uppercase();

    if SQL_KEYWORDS.contains(&upper.as_str()) {
        TokenKind::Keyword
    } else if SQL_BUILTINS.contains(&upper.as_str()) {
        TokenKind::Builtin
    } else if word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        TokenKind::Number
    } else {
        TokenKind::Identifier
    }
}

fn style_for(kind: TokenKind) -> Style {
    match kind {
        TokenKind::Keyword => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        TokenKind::Builtin => Style::default().fg(Color::LightBlue),
        TokenKind::String => Style::default().fg(Color::Green),
        TokenKind::QuotedIdent => Style::default().fg(Color::Yellow),
        TokenKind::Number => Style::default().fg(Color::Magenta),
        TokenKind::Comment => Style::default().fg(Color::DarkGray),
        TokenKind::Placeholder => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::ITALIC),
        TokenKind::Identifier => Style::default().fg(Color::White),
        TokenKind::Whitespace => Style::default(),
        TokenKind::Punctuation => Style::default().fg(Color::Gray),
    }
}

/// Convert SQL text into highlighted lines, one per source line
pub fn highlight_sql(sql: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current_line_spans = Vec::new();

    for token in tokenize(sql) {
        let style = style_for(token.kind);
        // Comments and strings may span lines
        for (i, part) in token.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut current_line_spans)));
            }
            if !part.is_empty() {
                current_line_spans.push(Span::styled(part.to_string(), style));
            }
        }
    }

    if !current_line_spans.is_empty() || sql.ends_with('\n') || lines.is_empty() {
        lines.push(Line::from(current_line_spans));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<(TokenKind, &str)> {
        tokenize(sql).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_tokenize_simple_select() {
        assert_eq!(
            kinds("SELECT * FROM recipe"),
            vec![
                (TokenKind::Keyword, "SELECT"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Punctuation, "*"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Keyword, "FROM"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Identifier, "recipe"),
            ]
        );
    }

    #[test]
    fn test_string_with_doubled_quote() {
        let tokens = kinds("WHERE name = 'Grandma''s pie' AND");
        assert!(tokens.contains(&(TokenKind::String, "'Grandma''s pie'")));
        assert_eq!(tokens.last(), Some(&(TokenKind::Keyword, "AND")));
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = kinds("SELECT 'oops");
        assert_eq!(tokens.last(), Some(&(TokenKind::String, "'oops")));
    }

    #[test]
    fn test_quoted_identifier_and_blob() {
        let tokens = kinds("SELECT \"my col\", X'00FF' FROM t");
        assert!(tokens.contains(&(TokenKind::QuotedIdent, "\"my col\"")));
        assert!(tokens.contains(&(TokenKind::String, "X'00FF'")));
    }

    #[test]
    fn test_placeholder() {
        let tokens = kinds("SELECT COUNT(*) FROM \"{table_name}\" WHERE id = {id}");
        assert!(tokens.contains(&(TokenKind::Builtin, "COUNT")));
        assert!(tokens.contains(&(TokenKind::Placeholder, "{id}")));
    }

    #[test]
    fn test_comments() {
        let tokens = kinds("SELECT 1 -- one\n/* multi\nline */ SELECT 2");
        assert!(tokens.contains(&(TokenKind::Comment, "-- one")));
        assert!(tokens.contains(&(TokenKind::Comment, "/* multi\nline */")));
        assert!(tokens.contains(&(TokenKind::Number, "2")));
    }

    #[test]
    fn test_highlight_keeps_line_count() {
        assert_eq!(highlight_sql("SELECT id\nFROM tag").len(), 2);
        assert_eq!(highlight_sql("SELECT 1;\n").len(), 2);
        assert_eq!(highlight_sql("/* a\nb\nc */").len(), 3);
        assert_eq!(highlight_sql("").len(), 1);
    }

    #[test]
    fn test_classify_keyword_any_case() {
        assert_eq!(classify_word("select"), TokenKind::Keyword);
        assert_eq!(classify_word("SeLeCt"), TokenKind::Keyword);
        assert_eq!(classify_word("45.67"), TokenKind::Number);
        assert_eq!(classify_word("recipe_id"), TokenKind::Identifier);
    }
}
