//! `WWW-Authenticate` challenges for 401 responses.
use http::header::InvalidHeaderValue;
use http::HeaderValue;
use std::borrow::Cow;
use std::fmt;

/// An authentication challenge rendered into the `WWW-Authenticate` header of
/// [`HttpError::unauthorized`](crate::HttpError::unauthorized).
///
/// A challenge either names a single scheme with ordered attributes, or lists several bare
/// schemes.
///
/// ```rust
/// use crashpad::Challenge;
///
/// let challenge = Challenge::new("sample")
///     .attribute("ttl", 0)
///     .empty_attribute("cache")
///     .attribute("foo", "bar");
/// assert_eq!(
///     challenge.header_value("get off my lawn!").unwrap(),
///     r#"sample ttl="0", cache="", foo="bar", error="get off my lawn!""#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    kind: ChallengeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChallengeKind {
    Scheme {
        scheme: Cow<'static, str>,
        attributes: Vec<(Cow<'static, str>, Option<String>)>,
    },
    Schemes(Vec<Cow<'static, str>>),
}

impl Challenge {
    /// Creates a challenge for a single scheme without attributes.
    pub fn new<S: Into<Cow<'static, str>>>(scheme: S) -> Self {
        Self {
            kind: ChallengeKind::Scheme {
                scheme: scheme.into(),
                attributes: Vec::new(),
            },
        }
    }

    /// Creates a challenge offering several schemes. Such a challenge carries no attributes and
    /// the message is not rendered into it.
    pub fn schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind: ChallengeKind::Schemes(schemes.into_iter().map(Into::into).collect()),
        }
    }

    /// Appends an attribute. Ignored for multi-scheme challenges.
    pub fn attribute<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<Cow<'static, str>>,
        V: fmt::Display,
    {
        self.push(name.into(), Some(value.to_string()));
        self
    }

    /// Appends an attribute without a value, rendered as `name=""`.
    pub fn empty_attribute<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.push(name.into(), None);
        self
    }

    fn push(&mut self, name: Cow<'static, str>, value: Option<String>) {
        if let ChallengeKind::Scheme { attributes, .. } = &mut self.kind {
            attributes.push((name, value));
        }
    }

    /// Renders the header value. `message` is appended as the `error` attribute unless it is
    /// empty.
    pub fn header_value(&self, message: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::try_from(self.render(message))
    }

    fn render(&self, message: &str) -> String {
        match &self.kind {
            ChallengeKind::Schemes(schemes) => schemes.join(", "),
            ChallengeKind::Scheme { scheme, attributes } => {
                let mut out = scheme.to_string();
                let params = attributes
                    .iter()
                    .map(|(name, value)| (name.as_ref(), value.as_deref().unwrap_or("")))
                    .chain((!message.is_empty()).then_some(("error", message)));
                for (i, (name, value)) in params.enumerate() {
                    out.push_str(if i == 0 { " " } else { ", " });
                    out.push_str(&format!("{name}=\"{}\"", escape(value)));
                }
                out
            }
        }
    }
}

fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '"']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}
