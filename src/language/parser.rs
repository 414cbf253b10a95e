use crate::language::types::TypeExpr;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, multispace0},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid type expression `{input}`: {message}")]
pub struct TypeParseError {
    pub input: String,
    pub message: String,
    pub offset: usize,
}

/// Parses the textual type syntax used by the type checker's reports:
/// `Writer (List Int) ()`, `OptionT Identity`, `[Int]`, `(A, B)`, `a -> b`.
pub fn parse_type(input: &str) -> Result<TypeExpr, TypeParseError> {
    match all_consuming(delimited(multispace0, type_expr, multispace0))(input) {
        Ok((_, ty)) => Ok(ty),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(TypeParseError {
            input: input.to_string(),
            message: format!("unexpected input at `{}`", e.input),
            offset: input.len() - e.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(TypeParseError {
            input: input.to_string(),
            message: "incomplete input".into(),
            offset: input.len(),
        }),
    }
}

fn type_expr(input: &str) -> IResult<&str, TypeExpr> {
    let (input, head) = application(input)?;
    let (input, ret) = opt(preceded(
        delimited(multispace0, tag("->"), multispace0),
        type_expr,
    ))(input)?;
    Ok(match ret {
        Some(ret) => (input, TypeExpr::Function(Box::new(head), Box::new(ret))),
        None => (input, head),
    })
}

fn application(input: &str) -> IResult<&str, TypeExpr> {
    let (input, head) = atom(input)?;
    let (input, args) = many0(preceded(multispace0, atom))(input)?;
    if args.is_empty() {
        return Ok((input, head));
    }
    match head {
        TypeExpr::Named(name, mut existing) => {
            existing.extend(args);
            Ok((input, TypeExpr::Named(name, existing)))
        }
        TypeExpr::Var(name) => Ok((input, TypeExpr::Named(name, args))),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

fn atom(input: &str) -> IResult<&str, TypeExpr> {
    alt((unit, parenthesised, list_sugar, named))(input)
}

fn unit(input: &str) -> IResult<&str, TypeExpr> {
    map(
        pair(tag("("), preceded(multispace0, tag(")"))),
        |_| TypeExpr::Unit,
    )(input)
}

fn parenthesised(input: &str) -> IResult<&str, TypeExpr> {
    let (input, mut items) = delimited(
        pair(tag("("), multispace0),
        separated_list1(delimited(multispace0, tag(","), multispace0), type_expr),
        pair(multispace0, tag(")")),
    )(input)?;
    if items.len() == 1 {
        Ok((input, items.remove(0)))
    } else {
        Ok((input, TypeExpr::Tuple(items)))
    }
}

fn list_sugar(input: &str) -> IResult<&str, TypeExpr> {
    map(
        delimited(
            pair(tag("["), multispace0),
            type_expr,
            pair(multispace0, tag("]")),
        ),
        TypeExpr::list_of,
    )(input)
}

fn named(input: &str) -> IResult<&str, TypeExpr> {
    map(identifier, |ident: &str| {
        if ident.starts_with(|c: char| c.is_ascii_lowercase()) {
            TypeExpr::Var(ident.to_string())
        } else {
            TypeExpr::named(ident)
        }
    })(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_application() {
        let ty = parse_type("Writer (List Int) ()").expect("parse");
        assert_eq!(
            ty,
            TypeExpr::apply(
                "Writer",
                vec![TypeExpr::list_of(TypeExpr::named("Int")), TypeExpr::Unit]
            )
        );
    }

    #[test]
    fn parses_list_sugar_and_tuples() {
        let ty = parse_type("[ (Int, String) ]").expect("parse");
        assert_eq!(
            ty,
            TypeExpr::list_of(TypeExpr::Tuple(vec![
                TypeExpr::named("Int"),
                TypeExpr::named("String")
            ]))
        );
    }

    #[test]
    fn function_arrow_is_right_associative() {
        let ty = parse_type("a -> b -> Option b").expect("parse");
        assert_eq!(
            ty.result_type(),
            &TypeExpr::apply("Option", vec![TypeExpr::Var("b".into())])
        );
        assert!(matches!(ty, TypeExpr::Function(_, ref ret) if matches!(**ret, TypeExpr::Function(_, _))));
    }

    #[test]
    fn transformer_witness_keeps_inner_monad_argument() {
        let ty = parse_type("OptionT Identity").expect("parse");
        assert_eq!(ty.head(), Some("OptionT"));
        assert_eq!(ty.args(), &[TypeExpr::named("Identity")]);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_type("Option Int )").unwrap_err();
        assert!(err.message.contains("unexpected input"));
    }
}
