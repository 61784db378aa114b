use logos::Logos;

/// Tokens for the session command language
/// One command per line, e.g. `material Plywood` or `dia 4 mm`

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r]+")] // Skip whitespace
#[logos(error = LexerError)]
pub enum Token {
    // Literals
    #[regex(r"-?(\d+\.?\d*|\.\d+)", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""[^"\n]*""#, |lex| lex.slice()[1..lex.slice().len()-1].to_string())]
    String(String),

    #[regex(r"[A-Za-z][A-Za-z0-9_\-]*", |lex| lex.slice().to_string())]
    Word(String),

    // Keywords - Selections
    #[token("material")]
    Material,

    #[token("species")]
    Species,

    #[token("tool")]
    Tool,

    #[token("operation")]
    #[token("op")]
    Operation,

    #[token("none")]
    Unset,

    // Keywords - Geometry
    #[token("doc")]
    #[token("depth")]
    Depth,

    #[token("dia")]
    #[token("diameter")]
    Diameter,

    #[token("teeth")]
    #[token("flutes")]
    Teeth,

    #[token("width")]
    #[token("woc")]
    Width,

    #[token("in")]
    Inch,

    #[token("mm")]
    Millimeter,

    // Keywords - Cutting data
    #[token("chipload")]
    Chipload,

    #[token("hardness")]
    Hardness,

    #[token("speed")]
    Speed,

    #[token("mode")]
    Mode,

    #[token("table")]
    Table,

    #[token("formula")]
    Formula,

    // Keywords - Queries
    #[token("power")]
    Power,

    #[token("choices")]
    Choices,

    #[token("tools")]
    Tools,

    #[token("operations")]
    Operations,

    #[token("reset")]
    Reset,

    #[token("show")]
    Show,

    // Newlines for statement separation
    #[token("\n")]
    Newline,

    // Comments
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r";[^\n]*", logos::skip)]
    Comment,
}

impl Token {
    /// Text of a token that can be part of an unquoted multi-word name
    pub fn as_name_part(&self) -> Option<String> {
        match self {
            Token::Word(w) => Some(w.clone()),
            Token::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexerError;

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lexer error")
    }
}

impl std::error::Error for LexerError {}

/// Lex the input, stopping at the first character that starts no token
pub fn lex(input: &str) -> Result<Vec<(Token, logos::Span)>, logos::Span> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(LexerError) => Err(span),
        })
        .collect()
}
