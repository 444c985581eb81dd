//! Scope shorthand parser
//!
//! `age>=18 & (status=active | orders/#>2)` becomes an AND compound holding a
//! leaf and a nested OR compound. `|` binds looser than `&`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Result, ScopeError};
use crate::scope::compound::{CompoundCondition, Junction};
use crate::scope::condition::Condition;
use crate::scope::node::Scope;
use crate::scope::operator;
use crate::scope::value::{Scalar, Value};

static WORD_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<key>.+?)\s+(?P<op>not\s+like|not\s+in|not\s+regexp|like|in|regexp)\s+(?P<value>.+)$")
        .expect("word operator pattern")
});

static SYMBOL_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<key>[^<>=!]+?)\s*(?P<op>>=|<=|!=|<>|>|<|=)\s*(?P<value>.*)$")
        .expect("symbol operator pattern")
});

static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w#./]+$").expect("key pattern"));

/// Parse a scope shorthand string
pub fn parse(condition: &str) -> Result<Scope> {
    let condition = condition.trim();
    if condition.is_empty() {
        return Err(ScopeError::InvalidCondition(
            "Empty condition".to_string(),
        ));
    }

    let tokens = tokenize(condition)?;
    parse_tokens(&tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Condition(String),
    And,
    Or,
    OpenParen,
    CloseParen,
}

fn flush(current: &mut String, tokens: &mut Vec<Token>) {
    let text = current.trim();
    if !text.is_empty() {
        tokens.push(Token::Condition(text.to_string()));
    }
    current.clear();
}

fn tokenize(condition: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut paren_depth = 0i32;
    let mut quoted = false;

    for c in condition.chars() {
        if quoted {
            current.push(c);
            if c == '\'' {
                quoted = false;
            }
            continue;
        }

        match c {
            '\'' => {
                quoted = true;
                current.push(c);
            }
            '(' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::OpenParen);
                paren_depth += 1;
            }
            ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::CloseParen);
                paren_depth -= 1;
                if paren_depth < 0 {
                    return Err(ScopeError::InvalidCondition(
                        "Unbalanced parentheses".to_string(),
                    ));
                }
            }
            '&' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::And);
            }
            '|' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Or);
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);

    if quoted {
        return Err(ScopeError::InvalidCondition(
            "Unterminated quote".to_string(),
        ));
    }
    if paren_depth != 0 {
        return Err(ScopeError::InvalidCondition(
            "Unbalanced parentheses".to_string(),
        ));
    }

    Ok(tokens)
}

/// Split at every top-level occurrence of `separator`
fn split_top_level<'a>(tokens: &'a [Token], separator: &Token) -> Vec<&'a [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => depth -= 1,
            t if depth == 0 && t == separator => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn parse_tokens(tokens: &[Token]) -> Result<Scope> {
    if tokens.is_empty() {
        return Err(ScopeError::InvalidCondition(
            "Empty token list".to_string(),
        ));
    }

    // OR has lower precedence than AND
    for (separator, junction) in [(Token::Or, Junction::Or), (Token::And, Junction::And)] {
        let parts = split_top_level(tokens, &separator);
        if parts.len() > 1 {
            let nodes = parts
                .into_iter()
                .map(parse_tokens)
                .collect::<Result<Vec<_>>>()?;
            return Ok(CompoundCondition::new(nodes, junction).into());
        }
    }

    // Handle parentheses
    if tokens.len() >= 2 {
        if let (Token::OpenParen, Token::CloseParen) = (&tokens[0], &tokens[tokens.len() - 1]) {
            return parse_tokens(&tokens[1..tokens.len() - 1]);
        }
    }

    if let [Token::Condition(cond)] = tokens {
        return parse_single_condition(cond).map(Scope::from);
    }

    Err(ScopeError::InvalidCondition(format!(
        "Cannot parse tokens: {:?}",
        tokens
    )))
}

fn op_start(caps: &Captures<'_>) -> usize {
    caps.name("op").map_or(usize::MAX, |m| m.start())
}

fn parse_single_condition(condition: &str) -> Result<Condition> {
    // The operator occurring first wins, so `a = 'x in y'` stays an equality
    let word = WORD_OPERATOR.captures(condition);
    let symbol = SYMBOL_OPERATOR.captures(condition);
    let caps = match (word, symbol) {
        (Some(w), Some(s)) => Some(if op_start(&w) < op_start(&s) { w } else { s }),
        (w, s) => w.or(s),
    };

    let Some(caps) = caps else {
        if !KEY.is_match(condition) {
            return Err(ScopeError::InvalidCondition(format!(
                "No operator found in: {}",
                condition
            )));
        }
        return Ok(Condition::predicate(condition));
    };

    let key = caps["key"].trim();
    if !KEY.is_match(key) {
        return Err(ScopeError::InvalidCondition(format!(
            "Invalid key: {}",
            key
        )));
    }
    let operator = match operator::normalize(&caps["op"]).as_str() {
        "<>" => "!=".to_string(),
        op => op.to_string(),
    };
    let value = parse_value(&caps["value"])?;

    Ok(Condition::new(key, operator, value))
}

fn parse_value(value_str: &str) -> Result<Value> {
    let value_str = value_str.trim();

    // Try to parse as list
    if value_str.starts_with('[') && value_str.ends_with(']') {
        let inner = value_str[1..value_str.len() - 1].trim();
        if inner.is_empty() {
            return Ok(Value::List(Vec::new()));
        }
        let items = split_list(inner)
            .into_iter()
            .map(parse_value)
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::List(items));
    }

    if value_str.len() >= 2 && value_str.starts_with('\'') && value_str.ends_with('\'') {
        return Ok(Value::from(&value_str[1..value_str.len() - 1]));
    }
    if value_str.starts_with('\'') || value_str.starts_with('[') {
        return Err(ScopeError::InvalidCondition(format!(
            "Invalid value: {}",
            value_str
        )));
    }

    match value_str.to_lowercase().as_str() {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::from(true)),
        "false" => return Ok(Value::from(false)),
        _ => {}
    }

    if let Ok(i) = value_str.parse::<i64>() {
        return Ok(Value::Scalar(Scalar::Int(i)));
    }
    if let Ok(f) = value_str.parse::<f64>() {
        return Ok(Value::Scalar(Scalar::Float(f)));
    }

    // Treat as string
    Ok(Value::from(value_str))
}

/// Split list items at commas outside quotes
fn split_list(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                items.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&inner[start..]);
    items
}
