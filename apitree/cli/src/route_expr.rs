//! Route expressions: `collection.collectionId(123).nestedId(456)`.
//!
//! An expression is a `.`-separated chain of property names, each optionally
//! followed by one or more argument lists. A leading argument list calls the
//! client root with an ad hoc path, as in `(/test/{id})`.

use apitree::{ApiClient, ComposeError, Route};
use thiserror::Error;

/// One navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Property(String),
    Call(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteExprError {
    #[error("empty route expression")]
    Empty,

    #[error("unclosed '(' starting at column {column}")]
    UnclosedCall { column: usize },

    #[error("missing property name at column {column}")]
    MissingProperty { column: usize },

    #[error("unexpected '{found}' at column {column}")]
    Unexpected { found: char, column: usize },
}

/// Parses a route expression into navigation steps.
pub fn parse(expr: &str) -> Result<Vec<Step>, RouteExprError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(RouteExprError::Empty);
    }

    let chars: Vec<char> = expr.chars().collect();
    let mut steps = Vec::new();
    let mut pos = 0;
    // A call is allowed before any property only at the very start.
    let mut expect_name = chars[0] != '(';

    while pos < chars.len() {
        if expect_name {
            let start = pos;
            while pos < chars.len() && !matches!(chars[pos], '.' | '(' | ')') {
                pos += 1;
            }
            if pos == start {
                return Err(match chars.get(pos) {
                    Some(')') => RouteExprError::Unexpected {
                        found: ')',
                        column: pos + 1,
                    },
                    _ => RouteExprError::MissingProperty { column: pos + 1 },
                });
            }
            steps.push(Step::Property(chars[start..pos].iter().collect()));
            expect_name = false;
            continue;
        }

        match chars[pos] {
            '(' => {
                let open = pos;
                let close = chars[open..]
                    .iter()
                    .position(|c| *c == ')')
                    .map(|offset| open + offset)
                    .ok_or(RouteExprError::UnclosedCall { column: open + 1 })?;
                let inner: String = chars[open + 1..close].iter().collect();
                steps.push(Step::Call(split_args(&inner)));
                pos = close + 1;
            }
            '.' => {
                pos += 1;
                expect_name = true;
                if pos == chars.len() {
                    return Err(RouteExprError::MissingProperty { column: pos + 1 });
                }
            }
            found => {
                return Err(RouteExprError::Unexpected {
                    found,
                    column: pos + 1,
                });
            }
        }
    }

    Ok(steps)
}

fn split_args(inner: &str) -> Vec<String> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|arg| arg.trim().to_string()).collect()
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no property '{name}' on {at} (available: {available})")]
    UnknownProperty {
        name: String,
        at: String,
        available: String,
    },

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Walks `steps` from the client root.
pub fn resolve(client: &ApiClient, steps: &[Step]) -> Result<Route, ResolveError> {
    let mut route = client.root();
    for step in steps {
        route = match step {
            Step::Property(name) => {
                route
                    .resource(name)
                    .ok_or_else(|| ResolveError::UnknownProperty {
                        name: name.clone(),
                        at: route.template().to_string(),
                        available: route.properties().join(", "),
                    })?
            }
            Step::Call(args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                route.call(&args)?
            }
        };
    }
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str) -> Step {
        Step::Property(name.to_string())
    }

    fn call(args: &[&str]) -> Step {
        Step::Call(args.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn parses_property_chains() {
        assert_eq!(
            parse("collection.collectionId(123).nestedId(456)").unwrap(),
            vec![
                prop("collection"),
                prop("collectionId"),
                call(&["123"]),
                prop("nestedId"),
                call(&["456"]),
            ]
        );
    }

    #[test]
    fn parses_multiple_and_empty_arguments() {
        assert_eq!(
            parse("mixed(123, 456)").unwrap(),
            vec![prop("mixed"), call(&["123", "456"])]
        );
        assert_eq!(parse("enum()").unwrap(), vec![prop("enum"), call(&[])]);
        assert_eq!(parse("~(1)").unwrap(), vec![prop("~"), call(&["1"])]);
    }

    #[test]
    fn parses_root_calls_with_dots_in_paths() {
        assert_eq!(
            parse("(/files/{name}.json)").unwrap(),
            vec![call(&["/files/{name}.json"])]
        );
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!(parse("  "), Err(RouteExprError::Empty));
        assert_eq!(
            parse("collection(1"),
            Err(RouteExprError::UnclosedCall { column: 11 })
        );
        assert_eq!(
            parse("collection..x"),
            Err(RouteExprError::MissingProperty { column: 12 })
        );
        assert_eq!(
            parse("collection."),
            Err(RouteExprError::MissingProperty { column: 12 })
        );
        assert_eq!(
            parse("a(1)b"),
            Err(RouteExprError::Unexpected {
                found: 'b',
                column: 5
            })
        );
    }
}
