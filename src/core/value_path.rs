use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the form state: `contact.email`, `dates[0].start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        self.segments.as_slice()
    }

    pub fn parse(input: &str) -> Result<Self, ValuePathParseError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValuePathParseError::new("empty path"));
        }

        let mut segments = Vec::new();
        for (position, part) in raw.split('.').enumerate() {
            let (key, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };
            if key.is_empty() {
                return Err(ValuePathParseError::new(format!(
                    "expected key in segment {position} of '{raw}'"
                )));
            }
            segments.push(PathSegment::Key(key.to_string()));

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(ValuePathParseError::new(format!(
                        "unexpected '{rest}' in '{raw}'"
                    )));
                };
                let Some(close) = inner.find(']') else {
                    return Err(ValuePathParseError::new(format!("unterminated '[' in '{raw}'")));
                };
                let index = inner[..close].trim().parse::<usize>().map_err(|_| {
                    ValuePathParseError::new(format!("index must be a number in '{raw}'"))
                })?;
                segments.push(PathSegment::Index(index));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self::new(segments))
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if idx == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePathParseError {
    message: String,
}

impl ValuePathParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValuePathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl std::error::Error for ValuePathParseError {}

#[cfg(test)]
mod tests {
    use super::{PathSegment, ValuePath};

    #[test]
    fn parse_nested_field() {
        let path = ValuePath::parse("location.city").expect("path should parse");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("location".to_string()),
                PathSegment::Key("city".to_string()),
            ]
        );
    }

    #[test]
    fn parse_indexes_after_keys() {
        let path = ValuePath::parse("dates[1].start").expect("path should parse");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("dates".to_string()),
                PathSegment::Index(1),
                PathSegment::Key("start".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "dates[1].start");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(ValuePath::parse("").is_err());
        assert!(ValuePath::parse(".city").is_err());
        assert!(ValuePath::parse("dates[x]").is_err());
        assert!(ValuePath::parse("dates[0").is_err());
    }
}
