//! Tokens.
//!
//! A token stream is produced once per document revision by the syntax provider and is read-only
//! afterwards. Positions are character offsets into the document text.

use std::ops::Range;

/// Index of a token inside [`DocumentSnapshot::tokens`](crate::DocumentSnapshot::tokens).
pub type TokenIndex = usize;

/// Token category.
///
/// Punctuators and keywords each get their own variant so predicates can match on them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TokenKind {
    Identifier,
    NumericLiteral,
    CharLiteral,
    StringLiteral,
    /// Objective-C `@` (as in `@"text"`).
    At,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    ColonColon,
    Comma,
    Dot,
    Arrow,
    Question,
    Ellipsis,

    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Exclaim,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    ExclaimEqual,
    LessLess,
    GreaterGreater,
    PlusPlus,
    MinusMinus,

    KwAuto,
    KwBool,
    KwBreak,
    KwCase,
    KwChar,
    KwClass,
    KwConst,
    KwContinue,
    KwDefault,
    KwDelete,
    KwDo,
    KwDouble,
    KwElse,
    KwEnum,
    KwExplicit,
    KwExtern,
    KwFalse,
    KwFloat,
    KwFor,
    KwIf,
    KwInline,
    KwInt,
    KwLong,
    KwMutable,
    KwNamespace,
    KwNew,
    KwPrivate,
    KwProtected,
    KwPublic,
    KwReturn,
    KwShort,
    KwSignals,
    KwSigned,
    KwSizeof,
    KwSlots,
    KwStatic,
    KwStruct,
    KwSwitch,
    KwThis,
    KwTrue,
    KwTypedef,
    KwUnion,
    KwUnsigned,
    KwVirtual,
    KwVoid,
    KwVolatile,
    KwWhile,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("auto", TokenKind::KwAuto),
    ("bool", TokenKind::KwBool),
    ("break", TokenKind::KwBreak),
    ("case", TokenKind::KwCase),
    ("char", TokenKind::KwChar),
    ("class", TokenKind::KwClass),
    ("const", TokenKind::KwConst),
    ("continue", TokenKind::KwContinue),
    ("default", TokenKind::KwDefault),
    ("delete", TokenKind::KwDelete),
    ("do", TokenKind::KwDo),
    ("double", TokenKind::KwDouble),
    ("else", TokenKind::KwElse),
    ("enum", TokenKind::KwEnum),
    ("explicit", TokenKind::KwExplicit),
    ("extern", TokenKind::KwExtern),
    ("false", TokenKind::KwFalse),
    ("float", TokenKind::KwFloat),
    ("for", TokenKind::KwFor),
    ("if", TokenKind::KwIf),
    ("inline", TokenKind::KwInline),
    ("int", TokenKind::KwInt),
    ("long", TokenKind::KwLong),
    ("mutable", TokenKind::KwMutable),
    ("namespace", TokenKind::KwNamespace),
    ("new", TokenKind::KwNew),
    ("private", TokenKind::KwPrivate),
    ("protected", TokenKind::KwProtected),
    ("public", TokenKind::KwPublic),
    ("return", TokenKind::KwReturn),
    ("short", TokenKind::KwShort),
    ("signals", TokenKind::KwSignals),
    ("Q_SIGNALS", TokenKind::KwSignals),
    ("signed", TokenKind::KwSigned),
    ("sizeof", TokenKind::KwSizeof),
    ("slots", TokenKind::KwSlots),
    ("Q_SLOTS", TokenKind::KwSlots),
    ("static", TokenKind::KwStatic),
    ("struct", TokenKind::KwStruct),
    ("switch", TokenKind::KwSwitch),
    ("this", TokenKind::KwThis),
    ("true", TokenKind::KwTrue),
    ("typedef", TokenKind::KwTypedef),
    ("union", TokenKind::KwUnion),
    ("unsigned", TokenKind::KwUnsigned),
    ("virtual", TokenKind::KwVirtual),
    ("void", TokenKind::KwVoid),
    ("volatile", TokenKind::KwVolatile),
    ("while", TokenKind::KwWhile),
];

impl TokenKind {
    /// Keyword for an identifier spelling, if it is one.
    pub fn keyword(spelling: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == spelling)
            .map(|(_, kind)| *kind)
    }

    /// Returns `true` for keywords.
    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| *kind == self)
    }

    /// Returns `true` for literal tokens.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::NumericLiteral | TokenKind::CharLiteral | TokenKind::StringLiteral
        )
    }

    /// Returns `true` for the six comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::EqualEqual
                | TokenKind::ExclaimEqual
        )
    }

    /// Returns `true` for `=` and the compound assignment operators.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::AmpEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
                | TokenKind::LessLessEqual
                | TokenKind::GreaterGreaterEqual
        )
    }

    /// Fixed spelling of punctuators and keywords. Empty for identifiers and literals.
    pub fn spell(self) -> &'static str {
        use TokenKind::*;
        match self {
            Identifier | NumericLiteral | CharLiteral | StringLiteral => "",
            At => "@",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Semicolon => ";",
            Colon => ":",
            ColonColon => "::",
            Comma => ",",
            Dot => ".",
            Arrow => "->",
            Question => "?",
            Ellipsis => "...",
            Equal => "=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            AmpEqual => "&=",
            PipeEqual => "|=",
            CaretEqual => "^=",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Amp => "&",
            AmpAmp => "&&",
            Pipe => "|",
            PipePipe => "||",
            Caret => "^",
            Tilde => "~",
            Exclaim => "!",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            EqualEqual => "==",
            ExclaimEqual => "!=",
            LessLess => "<<",
            GreaterGreater => ">>",
            PlusPlus => "++",
            MinusMinus => "--",
            kw => KEYWORDS
                .iter()
                .find(|(_, kind)| *kind == kw)
                .map(|(text, _)| *text)
                .unwrap_or(""),
        }
    }

    /// Punctuator for an exact spelling.
    pub fn punctuator(spelling: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match spelling {
            "@" => At,
            "(" => LParen,
            ")" => RParen,
            "{" => LBrace,
            "}" => RBrace,
            "[" => LBracket,
            "]" => RBracket,
            ";" => Semicolon,
            ":" => Colon,
            "::" => ColonColon,
            "," => Comma,
            "." => Dot,
            "->" => Arrow,
            "?" => Question,
            "..." => Ellipsis,
            "=" => Equal,
            "+=" => PlusEqual,
            "-=" => MinusEqual,
            "*=" => StarEqual,
            "/=" => SlashEqual,
            "%=" => PercentEqual,
            "&=" => AmpEqual,
            "|=" => PipeEqual,
            "^=" => CaretEqual,
            "<<=" => LessLessEqual,
            ">>=" => GreaterGreaterEqual,
            "+" => Plus,
            "-" => Minus,
            "*" => Star,
            "/" => Slash,
            "%" => Percent,
            "&" => Amp,
            "&&" => AmpAmp,
            "|" => Pipe,
            "||" => PipePipe,
            "^" => Caret,
            "~" => Tilde,
            "!" => Exclaim,
            "<" => Less,
            "<=" => LessEqual,
            ">" => Greater,
            ">=" => GreaterEqual,
            "==" => EqualEqual,
            "!=" => ExclaimEqual,
            "<<" => LessLess,
            ">>" => GreaterGreater,
            "++" => PlusPlus,
            "--" => MinusMinus,
            _ => return None,
        };
        Some(kind)
    }
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Category.
    pub kind: TokenKind,
    /// Character range in the document.
    pub range: Range<usize>,
    /// Raw source text of the token.
    pub spelling: String,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, range: Range<usize>, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            spelling: spelling.into(),
        }
    }

    /// Start character offset.
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Exclusive end character offset.
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Returns `true` if the token has kind `kind`.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Returns `true` if `offset` lies on the token, end inclusive.
    pub fn touches(&self, offset: usize) -> bool {
        self.range.start <= offset && offset <= self.range.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_and_punctuators_spell_back() {
        for spelling in ["if", "while", "switch", "class", "signals", "slots"] {
            let kind = TokenKind::keyword(spelling).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.spell(), spelling);
        }
        for spelling in ["<=", ">>=", "::", "->", "&&", "!"] {
            assert_eq!(TokenKind::punctuator(spelling).unwrap().spell(), spelling);
        }
        assert_eq!(TokenKind::keyword("Q_SLOTS"), Some(TokenKind::KwSlots));
        assert_eq!(TokenKind::keyword("foo"), None);
    }

    #[test]
    fn test_touches_is_end_inclusive() {
        let token = Token::new(TokenKind::LessEqual, 2..4, "<=");
        assert!(!token.touches(1));
        assert!(token.touches(2));
        assert!(token.touches(4));
        assert!(!token.touches(5));
    }
}
