use super::Value;

/// Containers nested deeper than this are not modelled.
const MAX_DEPTH: usize = 512;

/// Parses `repr` text into a [`Value`].
///
/// Text that does not fit the model, nests deeper than [`MAX_DEPTH`], or has
/// trailing input, becomes [`Value::Opaque`] holding the trimmed text.
pub fn parse_repr(text: &str) -> Value {
    let trimmed = text.trim();
    let mut parser = ReprParser::new(trimmed);
    match parser.parse_value() {
        Some(value) => {
            parser.skip_ws();
            if parser.at_end() {
                value
            } else {
                Value::Opaque(trimmed.to_string())
            }
        }
        None => Value::Opaque(trimmed.to_string()),
    }
}

struct ReprParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl ReprParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn parse_value(&mut self) -> Option<Value> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = self.parse_nested();
        self.depth -= 1;
        value
    }

    fn parse_nested(&mut self) -> Option<Value> {
        self.skip_ws();
        match self.peek()? {
            '[' => {
                self.bump();
                Some(Value::List(self.parse_items(']')?))
            }
            '(' => self.parse_paren(),
            '{' => self.parse_brace(),
            '<' => self.parse_angle(),
            '\'' | '"' => Some(Value::Str(self.parse_quoted()?)),
            'b' if matches!(self.peek_at(1), Some('\'') | Some('"')) => {
                self.bump();
                Some(Value::Bytes(self.parse_quoted_bytes()?))
            }
            '.' if self.starts_with("...") => {
                self.pos += 3;
                Some(Value::Ellipsis)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.parse_number(),
            c if c.is_alphabetic() || c == '_' => self.parse_name(),
            _ => None,
        }
    }

    /// Comma-separated values up to `close`; the opening bracket is consumed.
    fn parse_items(&mut self, close: char) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Some(items);
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.eat(close) {
                return Some(items);
            }
            if !self.eat(',') {
                return None;
            }
        }
    }

    fn parse_paren(&mut self) -> Option<Value> {
        self.bump();
        self.skip_ws();
        if self.eat(')') {
            return Some(Value::Tuple(Vec::new()));
        }
        let negative = self.peek() == Some('-');
        let first = self.parse_value()?;
        self.skip_ws();
        if matches!(first, Value::Int(_) | Value::Float(_))
            && matches!(self.peek(), Some('+') | Some('-'))
        {
            let re = match first {
                // `(-0-1j)`: the real part is a signed zero.
                Value::Int(0) if negative => -0.0,
                Value::Int(n) => n as f64,
                Value::Float(f) => f,
                _ => return None,
            };
            let Value::Complex { im, .. } = self.parse_number()? else {
                return None;
            };
            self.skip_ws();
            return self.eat(')').then_some(Value::Complex { re, im });
        }
        if self.eat(')') {
            return Some(first);
        }
        if !self.eat(',') {
            return None;
        }
        let mut items = vec![first];
        items.extend(self.parse_items(')')?);
        Some(Value::Tuple(items))
    }

    fn parse_brace(&mut self) -> Option<Value> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Some(Value::Dict(Vec::new()));
        }
        let first = self.parse_value()?;
        self.skip_ws();
        if !self.eat(':') {
            let mut items = vec![first];
            if !self.eat('}') {
                if !self.eat(',') {
                    return None;
                }
                items.extend(self.parse_items('}')?);
            }
            return Some(Value::Set(items));
        }
        let mut entries = vec![(first, self.parse_value()?)];
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Some(Value::Dict(entries));
            }
            if !self.eat(',') {
                return None;
            }
            self.skip_ws();
            if self.eat('}') {
                return Some(Value::Dict(entries));
            }
            let key = self.parse_value()?;
            self.skip_ws();
            if !self.eat(':') {
                return None;
            }
            entries.push((key, self.parse_value()?));
        }
    }

    fn parse_angle(&mut self) -> Option<Value> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        let text: String = self.chars[start..self.pos].iter().collect();
                        return Some(Value::Opaque(text));
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn parse_number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let body_start = self.pos;
        if self.starts_with("inf") || self.starts_with("nan") {
            self.pos += 3;
        } else {
            while let Some(c) = self.peek() {
                let exponent_sign = (c == '-' || c == '+')
                    && matches!(self.chars.get(self.pos - 1), Some('e') | Some('E'));
                if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        if self.pos == body_start {
            return None;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        if self.eat('j') || self.eat('J') {
            let im = token.parse::<f64>().ok()?;
            return Some(Value::Complex { re: 0.0, im });
        }
        let is_float = token.contains(['.', 'e', 'E']) || token.ends_with("inf") || token.ends_with("nan");
        if is_float {
            return token.parse::<f64>().ok().map(Value::Float);
        }
        // Integers beyond i64 are compared by their digits.
        Some(
            token
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or(Value::Opaque(token)),
        )
    }

    fn parse_name(&mut self) -> Option<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if self.peek() == Some('(') {
            self.bump();
            let args = self.parse_items(')')?;
            return Some(constructor_value(name, args));
        }
        match name.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::None),
            "NotImplemented" => Some(Value::NotImplemented),
            "Ellipsis" => Some(Value::Ellipsis),
            "inf" => Some(Value::Float(f64::INFINITY)),
            "nan" => Some(Value::Float(f64::NAN)),
            _ => None,
        }
    }

    fn parse_quoted(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\\' => match self.bump()? {
                    'x' => out.push(char::from_u32(self.parse_hex(2)?)?),
                    'u' => out.push(char::from_u32(self.parse_hex(4)?)?),
                    'U' => out.push(char::from_u32(self.parse_hex(8)?)?),
                    other => out.push(simple_escape(other)),
                },
                c => out.push(c),
            }
        }
    }

    fn parse_quoted_bytes(&mut self) -> Option<Vec<u8>> {
        let quote = self.bump()?;
        let mut out = Vec::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\\' => match self.bump()? {
                    'x' => out.push(u8::try_from(self.parse_hex(2)?).ok()?),
                    other => out.push(u8::try_from(simple_escape(other)).ok()?),
                },
                c => out.push(u8::try_from(c).ok()?),
            }
        }
    }

    fn parse_hex(&mut self, digits: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..digits {
            value = value * 16 + self.bump()?.to_digit(16)?;
        }
        Some(value)
    }
}

fn simple_escape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        other => other,
    }
}

fn constructor_value(callee: String, args: Vec<Value>) -> Value {
    match (callee.as_str(), args.as_slice()) {
        ("set", []) => Value::Set(Vec::new()),
        ("frozenset", []) => Value::FrozenSet(Vec::new()),
        ("bytearray", []) => Value::ByteArray(Vec::new()),
        ("frozenset", [Value::Set(items)]) => Value::FrozenSet(items.clone()),
        ("bytearray", [Value::Bytes(bytes)]) => Value::ByteArray(bytes.clone()),
        _ => Value::Call { callee, args },
    }
}
