//! # Method References
//!
//! The textual form that names a method together with its exact parameter
//! types:
//!
//! ```text
//! <declaringType>.<method>(<param_1>,<param_2>,...,<param_n>)
//! ```
//!
//! The declaring type is informational. Whoever dispatches the call resolves
//! the method against the implementation it actually holds, so only the method
//! name and the parameter tokens take part in matching.

use crate::error::Error;
use crate::error::Result;
use crate::types::ParamType;
use crate::value::Value;

/// A parsed method reference. Parameter tokens are kept as written; mapping
/// them to types requires a type universe.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct MethodRef {
    declaring_type: String,
    name: String,
    params: Vec<String>,
}

impl MethodRef {
    /// Builds a reference from a method's name and exact parameter types.
    pub fn new<'a>(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        params: impl IntoIterator<Item = &'a ParamType>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            params: params.into_iter().map(|p| p.token().to_string()).collect(),
        }
    }

    /// Builds a reference whose parameter types are the runtime types of `args`.
    ///
    /// Fails on `Value::Null`, which has no runtime type.
    pub fn for_args(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        args: &[Value],
    ) -> Result<Self> {
        let params = args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                arg.param_type()
                    .map(|ty| ty.token().to_string())
                    .ok_or(Error::UntypedArgument { index })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            params,
        })
    }

    /// Parses `Type.method(p1,p2)`.
    ///
    /// The head is split from the parameter list at the first `(`, and the method
    /// name is whatever follows the last `.` of the head. The parameter list is
    /// trimmed before testing for emptiness, but each token is kept exactly as
    /// written, so `int, int` names the types `int` and ` int`. Trailing empty
    /// tokens are dropped: `f(int,int,)` names the same method as `f(int,int)`.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = |reason| Error::MalformedMethodRef {
            text: text.to_string(),
            reason,
        };

        let (head, rest) = text.split_once('(').ok_or_else(|| malformed("missing '('"))?;
        let list = rest
            .trim_end()
            .strip_suffix(')')
            .ok_or_else(|| malformed("missing trailing ')'"))?;
        if list.contains(['(', ')']) {
            return Err(malformed("unbalanced parentheses"));
        }

        let (declaring_type, name) = match head.rfind('.') {
            Some(dot) => (&head[..dot], &head[dot + 1..]),
            None => ("", head),
        };
        if name.is_empty() {
            return Err(malformed("empty method name"));
        }

        let mut params: Vec<String> = list.trim().split(',').map(str::to_string).collect();
        while params.last().is_some_and(|p| p.is_empty()) {
            params.pop();
        }

        Ok(Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            params,
        })
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl std::str::FromStr for MethodRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.declaring_type.is_empty() {
            write!(f, "{}.", self.declaring_type)?;
        }
        write!(f, "{}({})", self.name, self.params.join(","))
    }
}
