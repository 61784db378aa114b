//! Session command scripts
//!
//! Parses the command language into statements and drives a [`Session`] with
//! them, one result line per command. The whole script is parsed before any
//! command runs.

use crate::error::SessionError;
use crate::lexer::{lex, Token};
use crate::session::{Outcome, ResolutionMode, Session};
use std::ops::Range;
use thiserror::Error;
use uom::si::f64::Length;
use uom::si::length::{inch, millimeter};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("unrecognised input")]
    Lex { span: Range<usize> },

    #[error("expected {expected}, got {got}")]
    UnexpectedToken {
        expected: &'static str,
        got: String,
        span: Range<usize>,
    },

    #[error("expected {expected} before end of line")]
    UnexpectedEnd {
        expected: &'static str,
        span: Range<usize>,
    },

    #[error("tooth count must be a whole number, got {value}")]
    InvalidCount { value: f64, span: Range<usize> },
}

impl ScriptError {
    pub fn span(&self) -> Range<usize> {
        match self {
            ScriptError::Lex { span }
            | ScriptError::UnexpectedToken { span, .. }
            | ScriptError::UnexpectedEnd { span, .. }
            | ScriptError::InvalidCount { span, .. } => span.clone(),
        }
    }

    /// Render the error against its source with ariadne
    pub fn render(&self, name: &str, source: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        let span = self.span();
        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, name, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(Label::new((name, span)).with_message("here"))
            .finish()
            .write((name, Source::from(source)), &mut out);

        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => format!("{}: {}", name, self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Choice list requested by `choices`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceList {
    Species,
    ToolMaterials,
    Operations,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Material(String),
    Species(Option<String>),
    ToolMaterial(Option<String>),
    Operation(Option<String>),
    DepthOfCut(f64), // inches
    Diameter(f64),   // inches
    Teeth(u32),
    CutWidth(f64), // inches
    Chipload(f64),
    Hardness(f64),
    SurfaceSpeed(f64),
    Mode(ResolutionMode),
    Power,
    Choices(ChoiceList),
    Reset,
    Show,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub command: Command,
    pub line: usize,
}

pub struct Parser {
    tokens: Vec<(Token, logos::Span)>,
    position: usize,
    current_line: usize,
    end: usize,
}

impl Parser {
    pub fn new(tokens: Vec<(Token, logos::Span)>, source_len: usize) -> Self {
        Self {
            tokens,
            position: 0,
            current_line: 1,
            end: source_len,
        }
    }

    /// Parse every statement in the script
    pub fn parse(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while let Some((token, _)) = self.peek() {
            if *token == Token::Newline {
                self.advance();
                self.current_line += 1;
                continue;
            }
            let line = self.current_line;
            let command = self.parse_command()?;
            self.expect_end_of_line()?;
            statements.push(Statement { command, line });
        }
        Ok(statements)
    }

    fn parse_command(&mut self) -> Result<Command> {
        let (token, span) = self.next("a command")?;
        let command = match token {
            Token::Material => Command::Material(self.parse_name()?),
            Token::Species => Command::Species(self.parse_optional_name()?),
            Token::Tool => Command::ToolMaterial(self.parse_optional_name()?),
            Token::Operation => Command::Operation(self.parse_optional_name()?),
            Token::Depth => Command::DepthOfCut(self.parse_length()?),
            Token::Diameter => Command::Diameter(self.parse_length()?),
            Token::Width => Command::CutWidth(self.parse_length()?),
            Token::Teeth => Command::Teeth(self.parse_count()?),
            Token::Chipload => Command::Chipload(self.parse_number()?),
            Token::Hardness => Command::Hardness(self.parse_number()?),
            Token::Speed => Command::SurfaceSpeed(self.parse_number()?),
            Token::Mode => match self.next("table or formula")? {
                (Token::Table, _) => Command::Mode(ResolutionMode::Table),
                (Token::Formula, _) => Command::Mode(ResolutionMode::Formula),
                (other, span) => return Err(unexpected("table or formula", &other, span)),
            },
            Token::Choices => match self.next("species, tools or operations")? {
                (Token::Species, _) => Command::Choices(ChoiceList::Species),
                (Token::Tools, _) => Command::Choices(ChoiceList::ToolMaterials),
                (Token::Operations, _) => Command::Choices(ChoiceList::Operations),
                (other, span) => {
                    return Err(unexpected("species, tools or operations", &other, span))
                }
            },
            Token::Power => Command::Power,
            Token::Reset => Command::Reset,
            Token::Show => Command::Show,
            other => return Err(unexpected("a command", &other, span)),
        };
        Ok(command)
    }

    /// Quoted string, or bare words up to the end of the line
    fn parse_name(&mut self) -> Result<String> {
        if let Some((Token::String(s), _)) = self.peek() {
            let s = s.clone();
            self.advance();
            return Ok(s);
        }

        let mut parts = Vec::new();
        while let Some(part) = self.peek().and_then(|(t, _)| t.as_name_part()) {
            parts.push(part);
            self.advance();
        }
        if parts.is_empty() {
            return Err(self.error_here("a name"));
        }
        Ok(parts.join(" "))
    }

    fn parse_optional_name(&mut self) -> Result<Option<String>> {
        if let Some((Token::Unset, _)) = self.peek() {
            self.advance();
            return Ok(None);
        }
        self.parse_name().map(Some)
    }

    fn parse_number(&mut self) -> Result<f64> {
        match self.next("a number")? {
            (Token::Number(n), _) => Ok(n),
            (other, span) => Err(unexpected("a number", &other, span)),
        }
    }

    fn parse_count(&mut self) -> Result<u32> {
        let span = self.peek().map(|(_, s)| s.clone());
        let value = self.parse_number()?;
        if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
            return Err(ScriptError::InvalidCount {
                value,
                span: span.unwrap_or(self.end..self.end),
            });
        }
        Ok(value as u32)
    }

    /// Number with an optional `in` or `mm` unit, in inches
    fn parse_length(&mut self) -> Result<f64> {
        let value = self.parse_number()?;
        match self.peek() {
            Some((Token::Millimeter, _)) => {
                self.advance();
                Ok(Length::new::<millimeter>(value).get::<inch>())
            }
            Some((Token::Inch, _)) => {
                self.advance();
                Ok(value)
            }
            _ => Ok(value),
        }
    }

    fn expect_end_of_line(&mut self) -> Result<()> {
        match self.peek() {
            None | Some((Token::Newline, _)) => Ok(()),
            Some((other, span)) => Err(unexpected("end of line", other, span.clone())),
        }
    }

    fn peek(&self) -> Option<&(Token, logos::Span)> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn next(&mut self, expected: &'static str) -> Result<(Token, logos::Span)> {
        match self.tokens.get(self.position).cloned() {
            Some((Token::Newline, span)) => Err(ScriptError::UnexpectedEnd { expected, span }),
            Some(item) => {
                self.advance();
                Ok(item)
            }
            None => Err(ScriptError::UnexpectedEnd {
                expected,
                span: self.end..self.end,
            }),
        }
    }

    fn error_here(&self, expected: &'static str) -> ScriptError {
        match self.peek() {
            Some((Token::Newline, span)) => ScriptError::UnexpectedEnd {
                expected,
                span: span.clone(),
            },
            Some((other, span)) => unexpected(expected, other, span.clone()),
            None => ScriptError::UnexpectedEnd {
                expected,
                span: self.end..self.end,
            },
        }
    }
}

fn unexpected(expected: &'static str, got: &Token, span: logos::Span) -> ScriptError {
    ScriptError::UnexpectedToken {
        expected,
        got: format!("{:?}", got),
        span,
    }
}

/// Lex and parse a whole script
pub fn parse(source: &str) -> Result<Vec<Statement>> {
    let tokens = lex(source).map_err(|span| ScriptError::Lex { span })?;
    Parser::new(tokens, source.len()).parse()
}

/// Apply one command and describe the result in one line
pub fn execute(session: &mut Session, command: &Command) -> String {
    match command {
        Command::Material(name) => describe(session.set_material_family(name)),
        Command::Species(name) => describe(session.set_material_species(name.as_deref())),
        Command::ToolMaterial(name) => describe(session.set_tool_material(name.as_deref())),
        Command::Operation(name) => describe(session.set_operation(name.as_deref())),
        Command::DepthOfCut(d) => describe(session.set_depth_of_cut(*d)),
        Command::Diameter(d) => describe(session.set_cutter_diameter(*d)),
        Command::Teeth(n) => describe(session.set_tooth_count(*n)),
        Command::CutWidth(w) => describe(session.set_cut_width(*w)),
        Command::Chipload(f) => describe(session.set_chipload(*f)),
        Command::Hardness(h) => describe(session.set_hardness(*h)),
        Command::SurfaceSpeed(s) => describe(session.set_surface_speed(*s)),
        Command::Mode(mode) => describe(session.set_mode(*mode)),
        Command::Reset => describe(session.reset_material()),
        Command::Power => match session.power() {
            Ok(p) => format!(
                "power: kp={} mrr={:.3} in3/min motor={:.3} hp",
                p.kp, p.removal_rate, p.motor_power
            ),
            Err(e) => describe_error(&e),
        },
        Command::Choices(list) => {
            let (label, values) = match list {
                ChoiceList::Species => {
                    let family = session.material().family.clone().unwrap_or_default();
                    ("species", session.distinct_species_for(&family))
                }
                ChoiceList::ToolMaterials => ("tools", session.distinct_tool_materials()),
                ChoiceList::Operations => ("operations", session.distinct_operations()),
            };
            format!("{}: {}", label, values.into_iter().collect::<Vec<_>>().join(", "))
        }
        Command::Show => show(session),
    }
}

fn describe(outcome: Outcome) -> String {
    match outcome {
        Ok(rec) => rec.to_string(),
        Err(e) => describe_error(&e),
    }
}

fn describe_error(error: &SessionError) -> String {
    match error {
        SessionError::Unresolved(u) => format!("unresolved: {}", u),
        other => format!("error: {}", other),
    }
}

fn show(session: &Session) -> String {
    fn or_dash<T: ToString>(v: Option<T>) -> String {
        v.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    let (tool, material, op) = (session.tool(), session.material(), session.operation());
    format!(
        "material={} species={} tool={} operation={} doc={} dia={} teeth={} mode={:?} rpm={} feedrate={}",
        or_dash(material.family.as_deref()),
        or_dash(material.species.as_deref()),
        or_dash(tool.material.as_deref()),
        or_dash(op.kind.as_deref()),
        op.depth_of_cut,
        or_dash(tool.diameter),
        tool.teeth,
        session.mode(),
        or_dash(op.rpm),
        or_dash(op.feed_rate),
    )
}

/// Run every statement, returning one output line per statement
pub fn run(session: &mut Session, statements: &[Statement]) -> Vec<String> {
    statements
        .iter()
        .map(|stmt| {
            tracing::debug!(line = stmt.line, command = ?stmt.command, "execute");
            execute(session, &stmt.command)
        })
        .collect()
}
