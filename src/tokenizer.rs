use crate::{CompileError, CompileResult};
use std::collections::VecDeque;
use std::fmt;
use std::ops::Index;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Exit,                             // "exit"
    Let,                              // "let"
    Ident { name: String },           // Identifiers
    IntLit { raw: String, val: u64 }, // Integer literals
    Semi,                             // ;
    OpenParen,                        // (
    CloseParen,                       // )
    Equals,                           // =
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Exit => write!(f, "'exit'"),
            Token::Let => write!(f, "'let'"),
            Token::Ident { name } => write!(f, "identifier `{}`", name),
            Token::IntLit { raw, .. } => write!(f, "integer literal {}", raw),
            Token::Semi => write!(f, "';'"),
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::Equals => write!(f, "'='"),
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenQueue(VecDeque<Token>);

impl Index<usize> for TokenQueue {
    type Output = Token;
    fn index(&self, i: usize) -> &Token {
        &self.0[i]
    }
}

impl From<Vec<Token>> for TokenQueue {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens.into())
    }
}

impl TokenQueue {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.0.front()
    }

    pub fn pop(&mut self) -> Option<Token> {
        self.0.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.0.iter()
    }

    /// Pops the front token if it equals `expected`, otherwise fails with `message`.
    pub fn expect(&mut self, expected: &Token, message: &str) -> CompileResult<()> {
        match self.0.front() {
            Some(token) if token == expected => {
                self.0.pop_front();
                Ok(())
            }
            other => Err(Self::syntax_error(message, other)),
        }
    }

    pub fn expect_ident(&mut self, message: &str) -> CompileResult<String> {
        match self.0.pop_front() {
            Some(Token::Ident { name }) => Ok(name),
            other => Err(Self::syntax_error(message, other.as_ref())),
        }
    }

    pub fn syntax_error(message: &str, found: Option<&Token>) -> CompileError {
        CompileError::Syntax {
            expected: message.to_string(),
            found: found.map_or_else(|| "end of input".to_string(), Token::to_string),
        }
    }

    fn is_alpha(c: char) -> bool {
        matches!(c, 'a'..='z' | 'A'..='Z' | '_')
    }

    fn is_alpha_num(c: char) -> bool {
        Self::is_alpha(c) || c.is_ascii_digit()
    }

    fn current(s: &str, i: usize) -> Option<char> {
        s[i..].chars().next()
    }

    fn skip_whitespace(s: &str, i: &mut usize) {
        while let Some(c) = Self::current(s, *i) {
            if !c.is_whitespace() {
                break;
            }
            *i += c.len_utf8();
        }
    }

    // Consumes the longest run of characters matching `pred`.
    fn extract_while(s: &str, i: &mut usize, pred: impl Fn(char) -> bool) -> String {
        let start = *i;
        while let Some(c) = Self::current(s, *i) {
            if !pred(c) {
                break;
            }
            *i += c.len_utf8();
        }
        s[start..*i].to_string()
    }

    fn extract_punct(s: &str, i: &mut usize) -> Option<Token> {
        let token = match Self::current(s, *i)? {
            ';' => Token::Semi,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            '=' => Token::Equals,
            _ => return None,
        };
        *i += 1;
        Some(token)
    }

    fn generate_token(&mut self, s: &str, i: &mut usize) -> CompileResult<()> {
        Self::skip_whitespace(s, i);
        let Some(c) = Self::current(s, *i) else {
            return Ok(());
        };

        if c.is_ascii_digit() {
            let raw = Self::extract_while(s, i, |c| c.is_ascii_digit());
            let val = raw
                .parse::<u64>()
                .map_err(|source| CompileError::InvalidInteger {
                    raw: raw.clone(),
                    source,
                })?;
            self.0.push_back(Token::IntLit { raw, val });
            return Ok(());
        }

        if Self::is_alpha(c) {
            let word = Self::extract_while(s, i, Self::is_alpha_num);
            let token = match word.as_str() {
                "exit" => Token::Exit,
                "let" => Token::Let,
                _ => Token::Ident { name: word },
            };
            self.0.push_back(token);
            return Ok(());
        }

        if let Some(punct) = Self::extract_punct(s, i) {
            self.0.push_back(punct);
            return Ok(());
        }

        Err(CompileError::UnexpectedCharacter { ch: c, pos: *i })
    }

    pub fn tokenize(s: &str) -> CompileResult<Self> {
        let mut rv = Self::default();
        let mut i = 0;
        while i < s.len() {
            rv.generate_token(s, &mut i)?;
        }
        debug!(tokens = rv.len(), "tokenized source");
        Ok(rv)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;

    fn int(val: u64) -> Token {
        Token::IntLit {
            raw: val.to_string(),
            val,
        }
    }

    fn ident(name: &str) -> Token {
        Token::Ident {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_tokenizer_exit() {
        let token_queue = TokenQueue::tokenize("exit(42);").expect("tokenizer error");
        assert_eq!(
            token_queue.0,
            vec![
                Token::Exit,
                Token::OpenParen,
                int(42),
                Token::CloseParen,
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_tokenizer_let_with_whitespace() {
        let token_queue =
            TokenQueue::tokenize("  let foo_1 =\n\t7 ;\r\n exit ( foo_1 ) ; ").expect("tokenizer error");
        assert_eq!(
            token_queue.0,
            vec![
                Token::Let,
                ident("foo_1"),
                Token::Equals,
                int(7),
                Token::Semi,
                Token::Exit,
                Token::OpenParen,
                ident("foo_1"),
                Token::CloseParen,
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_tokenizer_keyword_prefix_is_ident() {
        let token_queue = TokenQueue::tokenize("exits letter _let exit").expect("tokenizer error");
        assert_eq!(
            token_queue.0,
            vec![ident("exits"), ident("letter"), ident("_let"), Token::Exit]
        );
    }

    #[test]
    fn test_tokenizer_digits_then_letters() {
        // maximal munch: the digit run ends where the letters begin
        let token_queue = TokenQueue::tokenize("12ab").expect("tokenizer error");
        assert_eq!(token_queue.0, vec![int(12), ident("ab")]);
    }

    #[test]
    fn test_tokenizer_empty() {
        let token_queue = TokenQueue::tokenize(" \n ").expect("tokenizer error");
        assert!(token_queue.is_empty());
    }

    #[test]
    fn test_tokenizer_unexpected_character() {
        let err = TokenQueue::tokenize("exit(1 + 2);").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lexical);
        assert!(matches!(
            err,
            CompileError::UnexpectedCharacter { ch: '+', pos: 7 }
        ));
    }

    #[test]
    fn test_tokenizer_non_ascii_character() {
        let err = TokenQueue::tokenize("let é = 1;").unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnexpectedCharacter { ch: 'é', pos: 4 }
        ));
    }

    #[test]
    fn test_tokenizer_integer_overflow() {
        let err = TokenQueue::tokenize("exit(99999999999999999999);").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lexical);
        match err {
            CompileError::InvalidInteger { raw, .. } => assert_eq!(raw, "99999999999999999999"),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_expect_ident() {
        let mut token_queue = TokenQueue::tokenize("x 1").expect("tokenizer error");
        assert_eq!(token_queue.expect_ident("need name").expect("ident"), "x");
        match token_queue.expect_ident("need name") {
            Err(CompileError::Syntax { expected, found }) => {
                assert_eq!(expected, "need name");
                assert_eq!(found, "integer literal 1");
            }
            other => panic!("{:?}", other),
        }
        assert!(matches!(
            token_queue.expect_ident("need name"),
            Err(CompileError::Syntax { found, .. }) if found == "end of input"
        ));
    }

    #[test]
    fn test_tokenizer_u64_max() {
        let token_queue = TokenQueue::tokenize("18446744073709551615").expect("tokenizer error");
        assert_eq!(token_queue[0], int(u64::MAX));
    }
}
