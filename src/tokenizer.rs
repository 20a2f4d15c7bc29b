use crate::error::{Error, Result};

/// Represents the smallest meaningful units (atoms) of the statement
/// language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords ---
    Create,
    Drop,
    Use,
    Show,
    Database,
    Databases,
    Table,
    Tables,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    And,
    Or,
    Update,
    Set,
    Delete,
    Exit,

    // --- Identifiers & Literals ---
    /// A name representing a database, table, column or type label
    /// (e.g., `users`, `id`, `CHAR`). Type labels are deliberately not
    /// keywords so they stay free-form.
    Ident(String),
    /// A 64-bit integer literal, optionally negative (e.g., `42`, `-7`).
    Number(i64),
    /// A string literal between single quotes (e.g., `'Alice'`).
    String(String),

    // --- Symbols ---
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Comma `,`
    Comma,
    /// Semicolon `;`
    Semicolon,
    /// Wildcard symbol `*`
    Star,
    /// Equal to `=`
    Equal,
    /// Not equal to, written `!=` or `<>`
    NotEqual,
    /// Greater than `>`
    Greater,
    /// Lower than `<`
    Lower,
    /// Greater than or equal `>=`
    GreaterEqual,
    /// Lower than or equal `<=`
    LowerEqual,

    // --- Special ---
    /// Represents the End Of File/Input.
    Eof,
}

/// A lexical scanner that converts one raw statement line into a sequence of
/// [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens.
    ///
    /// # Errors
    /// Returns an error if an invalid character is encountered or if a
    /// literal (like a string) is malformed.
    ///
    /// # Example
    /// ```
    /// # use minidb::tokenizer::{Token, Tokenizer};
    /// let mut t = Tokenizer::new("SELECT *");
    /// let tokens = t.tokenize().unwrap();
    /// assert_eq!(tokens[0], Token::Select);
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current
    /// position.
    fn next_token(&mut self) -> Result<Token> {
        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '=' => {
                self.advance();
                Ok(Token::Equal)
            }
            '!' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    self.advance();
                    Ok(Token::NotEqual)
                } else {
                    Err(Error::Parse("expected '=' after '!'".into()))
                }
            }
            '<' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    self.advance();
                    Ok(Token::LowerEqual)
                } else if !self.is_at_end() && self.current_char() == '>' {
                    self.advance();
                    Ok(Token::NotEqual)
                } else {
                    Ok(Token::Lower)
                }
            }
            '>' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    self.advance();
                    Ok(Token::GreaterEqual)
                } else {
                    Ok(Token::Greater)
                }
            }
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            '-' => self.read_number(),
            '\'' => self.read_string(),
            _ => Err(Error::Parse(format!("character {ch:?} is not supported"))),
        }
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads a sequence of alphanumeric characters and determines if it's a
    /// reserved keyword or a user-defined identifier.
    ///
    /// Keywords are matched case-insensitively.
    fn read_identifier(&mut self) -> Result<Token> {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }

        match ident.to_uppercase().as_str() {
            "CREATE" => Ok(Token::Create),
            "DROP" => Ok(Token::Drop),
            "USE" => Ok(Token::Use),
            "SHOW" => Ok(Token::Show),
            "DATABASE" => Ok(Token::Database),
            "DATABASES" => Ok(Token::Databases),
            "TABLE" => Ok(Token::Table),
            "TABLES" => Ok(Token::Tables),
            "INSERT" => Ok(Token::Insert),
            "INTO" => Ok(Token::Into),
            "VALUES" => Ok(Token::Values),
            "SELECT" => Ok(Token::Select),
            "FROM" => Ok(Token::From),
            "WHERE" => Ok(Token::Where),
            "AND" => Ok(Token::And),
            "OR" => Ok(Token::Or),
            "UPDATE" => Ok(Token::Update),
            "SET" => Ok(Token::Set),
            "DELETE" => Ok(Token::Delete),
            "EXIT" => Ok(Token::Exit),
            _ => Ok(Token::Ident(ident)),
        }
    }

    /// Reads an integer literal, including an optional leading minus sign.
    fn read_number(&mut self) -> Result<Token> {
        let mut number = String::new();

        if self.current_char() == '-' {
            number.push('-');
            self.advance();
        }

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            number.push(self.current_char());
            self.advance();
        }

        number
            .parse::<i64>()
            .map(Token::Number)
            .map_err(|_| Error::Parse(format!("invalid number {number:?}")))
    }

    /// Reads a string literal enclosed in single quotes. There are no escape
    /// sequences; the literal ends at the first closing quote.
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != '\'' {
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(Error::Parse("unterminated string".into()));
        }

        // Skip the closing quote
        self.advance();

        Ok(Token::String(string))
    }
}
