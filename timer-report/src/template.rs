//! Report Templates
//!
//! A template is plain text with two kinds of sequences:
//!
//! ```text
//! %[option]field    substitute a measurement   (%r, %pu, %MR, %%)
//! \escape           emit a control character   (\n, \t, \%, \\)
//! ```
//!
//! Templates are tokenized once into [`Directive`]s. A template that parses
//! is valid; rendering walks the directives and cannot meet a malformed
//! sequence.

use crate::quantity::QuantityKind;
use std::str::{CharIndices, FromStr};
use thiserror::Error;

/// Errors found while parsing a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// `%` or `%<option>` at the end of the template
    #[error("format sequence at offset {offset} is cut off by the end of the string")]
    UnterminatedSpecifier {
        /// Byte offset of the `%`
        offset: usize,
    },

    /// `\` at the end of the template
    #[error("escape sequence at offset {offset} is cut off by the end of the string")]
    UnterminatedEscape {
        /// Byte offset of the `\`
        offset: usize,
    },

    /// Specifier letter that names no field
    #[error("unknown format specifier '{letter}' at offset {offset}")]
    UnknownField {
        /// Offending letter
        letter: char,
        /// Byte offset of the `%`
        offset: usize,
    },

    /// Option not allowed for the field, e.g. `p` on a byte count
    #[error("format option '{option}' cannot be used with '{field}' at offset {offset}")]
    IllegalOption {
        /// Option letter
        option: char,
        /// Field letter
        field: char,
        /// Byte offset of the `%`
        offset: usize,
    },

    /// Escape letter outside `n`, `t`, `%` and `\`
    #[error("unknown escape sequence '\\{letter}' at offset {offset}")]
    UnknownEscape {
        /// Offending letter
        letter: char,
        /// Byte offset of the `\`
        offset: usize,
    },
}

/// How a measurement is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatOption {
    /// `h`: adaptive units for human readers (default)
    #[default]
    Human,
    /// `m`: raw value (nanoseconds or bytes) as a decimal integer
    MaxDecimal,
    /// `M`: raw value as a hexadecimal integer
    MaxHex,
    /// `p`: seconds with two fractional digits (time fields only)
    Portable,
}

impl FormatOption {
    /// All options, in the order they are documented
    pub const ALL: [FormatOption; 4] = [
        FormatOption::Human,
        FormatOption::MaxDecimal,
        FormatOption::MaxHex,
        FormatOption::Portable,
    ];

    /// Option for a template letter
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'h' => Some(FormatOption::Human),
            'm' => Some(FormatOption::MaxDecimal),
            'M' => Some(FormatOption::MaxHex),
            'p' => Some(FormatOption::Portable),
            _ => None,
        }
    }

    /// Template letter of this option
    pub fn letter(self) -> char {
        match self {
            FormatOption::Human => 'h',
            FormatOption::MaxDecimal => 'm',
            FormatOption::MaxHex => 'M',
            FormatOption::Portable => 'p',
        }
    }
}

/// A measured quantity that can appear in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `r`: wall-clock time
    Real,
    /// `u`: user CPU time
    User,
    /// `s`: system CPU time
    System,
    /// `R`: maximum resident set size
    MaxRss,
    /// `f`: minor page faults
    MinorFaults,
    /// `F`: major page faults
    MajorFaults,
    /// `c`: voluntary context switches
    VoluntarySwitches,
    /// `C`: involuntary context switches
    InvoluntarySwitches,
}

impl Field {
    /// All fields, in the order they are documented
    pub const ALL: [Field; 8] = [
        Field::Real,
        Field::User,
        Field::System,
        Field::MaxRss,
        Field::MinorFaults,
        Field::MajorFaults,
        Field::VoluntarySwitches,
        Field::InvoluntarySwitches,
    ];

    /// Field for a template letter
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.letter() == letter)
    }

    /// Template letter of this field
    pub fn letter(self) -> char {
        match self {
            Field::Real => 'r',
            Field::User => 'u',
            Field::System => 's',
            Field::MaxRss => 'R',
            Field::MinorFaults => 'f',
            Field::MajorFaults => 'F',
            Field::VoluntarySwitches => 'c',
            Field::InvoluntarySwitches => 'C',
        }
    }

    /// Kind of quantity this field holds
    pub fn kind(self) -> QuantityKind {
        match self {
            Field::Real | Field::User | Field::System => QuantityKind::Time,
            Field::MaxRss => QuantityKind::Bytes,
            Field::MinorFaults
            | Field::MajorFaults
            | Field::VoluntarySwitches
            | Field::InvoluntarySwitches => QuantityKind::Count,
        }
    }

    /// Whether `%<option><field>` is a legal specifier
    pub fn accepts(self, option: FormatOption) -> bool {
        self.kind().accepts(option)
    }
}

/// Backslash escapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// `\n`
    Newline,
    /// `\t`
    Tab,
    /// `\%`
    Percent,
    /// `\\`
    Backslash,
}

impl Escape {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'n' => Some(Escape::Newline),
            't' => Some(Escape::Tab),
            '%' => Some(Escape::Percent),
            '\\' => Some(Escape::Backslash),
            _ => None,
        }
    }

    /// Character this escape stands for
    pub fn output(self) -> char {
        match self {
            Escape::Newline => '\n',
            Escape::Tab => '\t',
            Escape::Percent => '%',
            Escape::Backslash => '\\',
        }
    }
}

/// One parsed unit of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Character copied to the output as-is
    Literal(char),
    /// Backslash escape
    Escape(Escape),
    /// `%%`
    Percent,
    /// `%[option]field`
    Specifier {
        /// Presentation, `Human` when the option letter is omitted
        option: FormatOption,
        /// Measured quantity
        field: Field,
    },
}

/// A validated report template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    directives: Vec<Directive>,
}

impl Template {
    /// Parse and validate a template string
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut directives = Vec::with_capacity(source.len());
        let mut chars = source.char_indices();

        while let Some((offset, c)) = chars.next() {
            let directive = match c {
                '%' => parse_specifier(offset, &mut chars)?,
                '\\' => {
                    let (_, letter) = chars
                        .next()
                        .ok_or(TemplateError::UnterminatedEscape { offset })?;
                    let escape = Escape::from_letter(letter)
                        .ok_or(TemplateError::UnknownEscape { letter, offset })?;
                    Directive::Escape(escape)
                }
                other => Directive::Literal(other),
            };
            directives.push(directive);
        }

        Ok(Self {
            source: source.to_string(),
            directives,
        })
    }

    /// The template as it was written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed directives in template order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Fields referenced by this template, in order of appearance
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.directives.iter().filter_map(|directive| match directive {
            Directive::Specifier { field, .. } => Some(*field),
            _ => None,
        })
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check a template without keeping the parse result.
///
/// Pure and repeatable; safe to call before any resources are acquired.
pub fn validate(template: &str) -> bool {
    Template::parse(template).is_ok()
}

/// Parse the rest of a `%` sequence starting at `offset`.
fn parse_specifier(offset: usize, chars: &mut CharIndices<'_>) -> Result<Directive, TemplateError> {
    let unterminated = TemplateError::UnterminatedSpecifier { offset };

    let (_, mut letter) = chars.next().ok_or(unterminated.clone())?;
    let option = FormatOption::from_letter(letter);
    if option.is_some() {
        (_, letter) = chars.next().ok_or(unterminated)?;
    }

    if letter == '%' {
        return match option {
            None => Ok(Directive::Percent),
            Some(option) => Err(TemplateError::IllegalOption {
                option: option.letter(),
                field: '%',
                offset,
            }),
        };
    }

    let field = Field::from_letter(letter).ok_or(TemplateError::UnknownField { letter, offset })?;
    let option = option.unwrap_or_default();
    if !field.accepts(option) {
        return Err(TemplateError::IllegalOption {
            option: option.letter(),
            field: letter,
            offset,
        });
    }

    Ok(Directive::Specifier { option, field })
}
