use crate::condition::{CmpOp, Condition};
use crate::error::{Error, Result};
use crate::tokenizer::{Token, Tokenizer};
use crate::value::Value;
use crate::{ast::*, ColumnDef};

/// Tokenizes and parses one statement in a single call.
///
/// # Errors
/// Returns [Error::Parse] if the input is not a well-formed statement.
///
/// # Example
/// ```
/// # use minidb::{ast::Statement, parser};
/// let statement = parser::parse("USE shop;").unwrap();
/// assert_eq!(statement, Statement::UseDatabase { name: "shop".into() });
/// ```
pub fn parse(input: &str) -> Result<Statement> {
    let mut tokenizer = Tokenizer::new(input);
    let tokens = tokenizer.tokenize()?;

    let mut parser = Parser::new(tokens);
    parser.parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Statement> {
        let statement = match self.current_token() {
            Token::Create => self.parse_create(),
            Token::Drop => self.parse_drop(),
            Token::Use => self.parse_use(),
            Token::Show => self.parse_show(),
            Token::Insert => self.parse_insert(),
            Token::Select => self.parse_select(),
            Token::Update => self.parse_update(),
            Token::Delete => self.parse_delete(),
            Token::Exit => {
                self.advance();
                Ok(Statement::Exit)
            }
            token => Err(Error::Parse(format!("unexpected token: {token:?}"))),
        }?;

        // Semicolons are optional, skip one if present
        if matches!(self.current_token(), Token::Semicolon) {
            self.advance();
        }

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(Error::Parse(format!(
                "unexpected token after statement: {:?}",
                self.current_token()
            )));
        }

        Ok(statement)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    fn consume(&mut self, expected: Token) -> Result<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(Error::Parse(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn consume_ident(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Ident(string) => {
                let string = string.clone(); // Get the name
                self.advance();
                Ok(string)
            }
            token => Err(Error::Parse(format!(
                "expected identifier, found {token:?}"
            ))),
        }
    }

    fn consume_number(&mut self) -> Result<i64> {
        match self.current_token() {
            Token::Number(n) => {
                let n = *n;
                self.advance();
                Ok(n)
            }
            token => Err(Error::Parse(format!("expected number, found {token:?}"))),
        }
    }

    /// Reads a literal value (`42`, `-7`, `'Alice'`).
    fn parse_literal(&mut self) -> Result<Value> {
        match self.current_token() {
            Token::Number(n) => {
                let n = *n;
                self.advance();
                Ok(Value::Int(n))
            }
            Token::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(Value::string(s))
            }
            token => Err(Error::Parse(format!(
                "expected literal value, found {token:?}"
            ))),
        }
    }

    // --- Statements ---

    fn parse_create(&mut self) -> Result<Statement> {
        self.consume(Token::Create)?;
        match self.current_token() {
            Token::Database => {
                self.advance();
                let name = self.consume_ident()?;
                Ok(Statement::CreateDatabase { name })
            }
            Token::Table => {
                self.advance();
                self.parse_create_table()
            }
            token => Err(Error::Parse(format!(
                "expected DATABASE or TABLE after CREATE, found {token:?}"
            ))),
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        let name = self.consume_ident()?;
        self.consume(Token::LeftParen)?;
        let mut columns = vec![];
        loop {
            columns.push(self.parse_column_def()?);
            match self.current_token() {
                Token::RightParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                _ => return Err(Error::Parse("expected ',' or ')'".into())),
            }
        }
        Ok(Statement::CreateTable(CreateTable { name, columns }))
    }

    /// Parses `name label` or `name label(width)`. The type label is kept as
    /// raw text; a width suffix is folded back into it so `CHAR(20)` is
    /// stored as the single label `CHAR(20)`.
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.consume_ident()?;
        let mut data_type = self.consume_ident()?;

        if matches!(self.current_token(), Token::LeftParen) {
            self.advance();
            let width = self.consume_number()?;
            self.consume(Token::RightParen)?;
            data_type = format!("{data_type}({width})");
        }

        Ok(ColumnDef { name, data_type })
    }

    fn parse_drop(&mut self) -> Result<Statement> {
        self.consume(Token::Drop)?;
        match self.current_token() {
            Token::Database => {
                self.advance();
                let name = self.consume_ident()?;
                Ok(Statement::DropDatabase { name })
            }
            Token::Table => {
                self.advance();
                let name = self.consume_ident()?;
                Ok(Statement::DropTable { name })
            }
            token => Err(Error::Parse(format!(
                "expected DATABASE or TABLE after DROP, found {token:?}"
            ))),
        }
    }

    fn parse_use(&mut self) -> Result<Statement> {
        self.consume(Token::Use)?;
        let name = self.consume_ident()?;
        Ok(Statement::UseDatabase { name })
    }

    fn parse_show(&mut self) -> Result<Statement> {
        self.consume(Token::Show)?;
        match self.current_token() {
            Token::Databases => {
                self.advance();
                Ok(Statement::ShowDatabases)
            }
            Token::Tables => {
                self.advance();
                Ok(Statement::ShowTables)
            }
            token => Err(Error::Parse(format!(
                "expected DATABASES or TABLES after SHOW, found {token:?}"
            ))),
        }
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.consume(Token::Insert)?;
        self.consume(Token::Into)?;
        let table = self.consume_ident()?;

        // Optional explicit column list
        let columns = if matches!(self.current_token(), Token::LeftParen) {
            self.advance();
            let mut columns = vec![];
            if !matches!(self.current_token(), Token::RightParen) {
                loop {
                    columns.push(self.consume_ident()?);
                    match self.current_token() {
                        Token::RightParen => break,
                        Token::Comma => self.advance(),
                        _ => return Err(Error::Parse("expected ',' or ')'".into())),
                    }
                }
            }
            self.consume(Token::RightParen)?;
            Some(columns)
        } else {
            None
        };

        self.consume(Token::Values)?;
        self.consume(Token::LeftParen)?;
        let mut values = vec![];
        if !matches!(self.current_token(), Token::RightParen) {
            loop {
                values.push(self.parse_literal()?);
                match self.current_token() {
                    Token::RightParen => break,
                    Token::Comma => self.advance(),
                    _ => return Err(Error::Parse("expected ',' or ')'".into())),
                }
            }
        }
        self.consume(Token::RightParen)?;

        Ok(Statement::Insert(Insert {
            table,
            columns,
            values,
        }))
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.consume(Token::Select)?;

        let projection = if matches!(self.current_token(), Token::Star) {
            self.advance();
            Projection::All
        } else {
            let mut columns = vec![self.consume_ident()?];
            while matches!(self.current_token(), Token::Comma) {
                self.advance();
                columns.push(self.consume_ident()?);
            }
            Projection::Columns(columns)
        };

        self.consume(Token::From)?;
        let mut tables = vec![self.consume_ident()?];
        while matches!(self.current_token(), Token::Comma) {
            self.advance();
            tables.push(self.consume_ident()?);
        }

        let condition = self.parse_where_opt()?;

        Ok(Statement::Select(Select {
            projection,
            tables,
            condition,
        }))
    }

    fn parse_update(&mut self) -> Result<Statement> {
        self.consume(Token::Update)?;
        let table = self.consume_ident()?;
        self.consume(Token::Set)?;

        let mut assignments = vec![];
        loop {
            let column = self.consume_ident()?;
            self.consume(Token::Equal)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });
            match self.current_token() {
                Token::Comma => self.advance(),
                _ => break,
            }
        }

        let condition = self.parse_where_opt()?;

        Ok(Statement::Update(Update {
            table,
            assignments,
            condition,
        }))
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.consume(Token::Delete)?;
        self.consume(Token::From)?;
        let table = self.consume_ident()?;
        let condition = self.parse_where_opt()?;

        Ok(Statement::Delete(Delete { table, condition }))
    }

    // --- Conditions ---

    fn parse_where_opt(&mut self) -> Result<Option<Condition>> {
        if matches!(self.current_token(), Token::Where) {
            self.advance();
            Ok(Some(self.parse_condition()?))
        } else {
            Ok(None)
        }
    }

    /// Entry point of the condition grammar. `OR` binds loosest, then `AND`,
    /// then comparisons; parentheses override.
    fn parse_condition(&mut self) -> Result<Condition> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Condition> {
        let mut left = self.parse_and()?;
        while matches!(self.current_token(), Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition> {
        let mut left = self.parse_comparison()?;
        while matches!(self.current_token(), Token::And) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Condition> {
        if matches!(self.current_token(), Token::LeftParen) {
            self.advance();
            let condition = self.parse_or()?;
            self.consume(Token::RightParen)?;
            return Ok(condition);
        }

        let column = self.consume_ident()?;
        let op = match self.current_token() {
            Token::Equal => CmpOp::Eq,
            Token::NotEqual => CmpOp::Ne,
            Token::Greater => CmpOp::Gt,
            Token::Lower => CmpOp::Lt,
            Token::GreaterEqual => CmpOp::Ge,
            Token::LowerEqual => CmpOp::Le,
            token => {
                return Err(Error::Parse(format!(
                    "expected comparison operator, found {token:?}"
                )));
            }
        };
        self.advance();
        let value = self.parse_literal()?;

        Ok(Condition::Cmp { column, op, value })
    }
}
